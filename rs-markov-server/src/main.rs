use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::middleware::{Condition, Logger};
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use log::{error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;

use rs_markov_core::io::list_files;
use rs_markov_core::{diffuse, Generator, MarkovError};

mod config;

use config::{ServerConfig, CONFIG_ENV};

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	nb_try: Option<usize>,
	seed: Option<u64>,
}

/// Query parameters for the `/v1/enumerate` endpoint
#[derive(Deserialize)]
struct EnumerateParams {
	min: Option<usize>,
	max: Option<usize>,
	limit: Option<usize>,
	include_known: Option<bool>,
}

/// Query parameters for the `/v1/encode` endpoint
#[derive(Deserialize)]
struct EncodeParams {
	numbers: Option<String>,
	diffuse: Option<bool>,
}

#[derive(Deserialize)]
struct ModelQuery {
	name: Option<String>,
}

struct SharedData {
	generator: Option<Arc<Generator>>,
	config: ServerConfig,
}

impl EncodeParams {
	/// Parses the comma separated list of numbers.
	///
	/// With `diffuse`, every number must fit in 32 bits and is scrambled.
	fn values(&self) -> Result<Vec<(u64, u64)>, String> {
		let numbers = match &self.numbers {
			Some(s) if !s.trim().is_empty() => s.trim(),
			_ => return Err("Missing or empty numbers".into()),
		};

		numbers
			.split(',')
			.map(|s| s.trim())
			.filter(|s| !s.is_empty())
			.map(|s| {
				let number = s.parse::<u64>().map_err(|_| format!("'{s}' is not a non-negative integer"))?;
				if self.diffuse.unwrap_or(false) {
					let small = u32::try_from(number).map_err(|_| format!("{number} does not fit in 32 bits"))?;
					Ok((number, diffuse(small) as u64))
				} else {
					Ok((number, number))
				}
			})
			.collect()
	}
}

/// Maps a chain error to an HTTP response.
///
/// Caller mistakes are 400, model-consistency problems are 500.
fn error_response(e: &MarkovError) -> HttpResponse {
	match e {
		MarkovError::InvalidBounds { .. }
		| MarkovError::InvalidThreshold(_)
		| MarkovError::InvalidOption(_)
		| MarkovError::ReservedSymbol { .. } => HttpResponse::BadRequest().body(e.to_string()),
		MarkovError::Io(io) if io.kind() == ErrorKind::NotFound => HttpResponse::NotFound().body(e.to_string()),
		_ => {
			error!("request failed: {e}");
			HttpResponse::InternalServerError().body(e.to_string())
		}
	}
}

fn no_model() -> HttpResponse {
	HttpResponse::Conflict().body("No model loaded")
}

/// Clones the loaded model and the configuration out of the shared state, so
/// requests do their work without holding the lock.
fn snapshot(data: &Mutex<SharedData>) -> Result<(Arc<Generator>, ServerConfig), HttpResponse> {
	let shared_data = data
		.lock()
		.map_err(|_| HttpResponse::InternalServerError().body("Model lock failed"))?;
	match &shared_data.generator {
		Some(g) => Ok((Arc::clone(g), shared_data.config.clone())),
		None => Err(no_model()),
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates one name by weighted random walk, avoiding training samples.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let (generator, config) = match snapshot(&data) {
		Ok(s) => s,
		Err(response) => return response,
	};

	let nb_try = query.nb_try.unwrap_or(config.generator.nb_try);
	let result = match query.seed {
		Some(seed) => generator.predict(&mut StdRng::seed_from_u64(seed), nb_try),
		None => generator.predict(&mut rand::rng(), nb_try),
	};

	match result {
		Ok(word) => HttpResponse::Ok().body(word),
		Err(e) => error_response(&e),
	}
}

/// HTTP GET endpoint `/v1/enumerate`
///
/// Lists the names of `min..=max` letters the model can produce, most likely
/// first, one per line. Training samples are skipped unless `include_known`.
#[get("/v1/enumerate")]
async fn get_enumerated(data: web::Data<Mutex<SharedData>>, query: web::Query<EnumerateParams>) -> impl Responder {
	let (generator, config) = match snapshot(&data) {
		Ok(s) => s,
		Err(response) => return response,
	};

	let min = query.min.unwrap_or(config.generator.min_len());
	let max = query.max.unwrap_or(config.generator.max_len());
	let limit = query.limit.unwrap_or(config.enumerate_limit).min(config.enumerate_limit);
	let include_known = query.include_known.unwrap_or(false);

	// The walk can be long when most candidates are samples.
	let words = web::block(move || -> Result<Vec<String>, MarkovError> {
		if include_known {
			generator.chain().iter(min, max).and_then(|s| s.take(limit).collect())
		} else {
			generator.novel(min, max).and_then(|s| s.take(limit).collect())
		}
	})
	.await;

	match words {
		Ok(Ok(words)) => HttpResponse::Ok().body(words.join("\n")),
		Ok(Err(e)) => error_response(&e),
		Err(e) => {
			error!("enumeration task failed: {e}");
			HttpResponse::InternalServerError().body("Enumeration failed")
		}
	}
}

/// HTTP GET endpoint `/v1/encode`
///
/// Encodes comma separated numbers, one `number: name` line each.
#[get("/v1/encode")]
async fn get_encoded(data: web::Data<Mutex<SharedData>>, query: web::Query<EncodeParams>) -> impl Responder {
	let values = match query.values() {
		Ok(v) => v,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let (generator, _) = match snapshot(&data) {
		Ok(s) => s,
		Err(response) => return response,
	};

	let mut lines = Vec::with_capacity(values.len());
	for (number, value) in values {
		match generator.encode(value) {
			Ok(word) => lines.push(format!("{number}: {word}")),
			Err(e) => return error_response(&e),
		}
	}

	HttpResponse::Ok().body(lines.join("\n"))
}

/// HTTP GET endpoint `/v1/models`
///
/// Lists the sample files available in the data directory.
#[get("/v1/models")]
async fn get_models(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let (data_dir, extension) = match data.lock() {
		Ok(m) => (m.config.data_dir.clone(), m.config.sample_extension.clone()),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match list_files(&data_dir, &extension) {
		Ok(files) => {
			let suffix = format!(".{extension}");
			let names: Vec<&str> = files.iter().map(|f| f.strip_suffix(&suffix).unwrap_or(f.as_str())).collect();
			HttpResponse::Ok().body(names.join("\n"))
		}
		Err(_) => HttpResponse::InternalServerError().body("Failed to list models"),
	}
}

#[get("/v1/loaded_model")]
async fn get_loaded_model(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match &shared_data.generator {
		Some(g) => HttpResponse::Ok().body(g.name().to_owned()),
		None => no_model(),
	}
}

/// HTTP PUT endpoint `/v1/load_model`
///
/// Trains a new model from `data_dir/<name>.<ext>` and replaces the current
/// one. The current model is kept if training fails.
#[put("/v1/load_model")]
async fn put_model(data: web::Data<Mutex<SharedData>>, query: web::Query<ModelQuery>) -> impl Responder {
	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty model name"),
	};

	let (path, options) = match data.lock() {
		Ok(m) => (m.config.model_path(name), m.config.generator.clone()),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let path = match path {
		Some(p) => p,
		None => return HttpResponse::BadRequest().body(format!("Invalid model name '{name}'")),
	};

	// Train outside the lock; it can take a while on large sample files.
	let generator = match Generator::new(&path, &options) {
		Ok(g) => g,
		Err(e) => {
			warn!("failed to load model '{}': {}", name, e);
			return error_response(&e);
		}
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	info!("model '{}' loaded with {} states", generator.name(), generator.chain().len());
	shared_data.generator = Some(Arc::new(generator));

	HttpResponse::Ok().body("Model loaded successfully")
}

/// Registers every endpoint.
fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated)
		.service(get_enumerated)
		.service(get_encoded)
		.service(get_models)
		.service(get_loaded_model)
		.service(put_model);
}

/// Main entry point for the server.
///
/// Reads the configuration (first argument, or `RS_MARKOV_CONFIG`), trains
/// the default model if one is configured, wraps the shared state in a
/// `Mutex` and starts an Actix-web HTTP server.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let config_path = std::env::args()
		.nth(1)
		.or_else(|| std::env::var(CONFIG_ENV).ok())
		.map(PathBuf::from);
	let config = ServerConfig::load(config_path.as_deref())?;

	let generator = match config.default_model.as_deref().and_then(|name| config.model_path(name)) {
		Some(path) => match Generator::new(&path, &config.generator) {
			Ok(g) => {
				info!("model '{}' loaded with {} states", g.name(), g.chain().len());
				Some(Arc::new(g))
			}
			Err(e) => {
				warn!("default model {} not loaded: {}", path.display(), e);
				None
			}
		},
		None => None,
	};

	let bind = (config.host.clone(), config.port);
	let cors = config.cors;
	info!("listening on {}:{}", bind.0, bind.1);

	let shared_data = web::Data::new(Mutex::new(SharedData { generator, config }));

	HttpServer::new(move || {
		App::new()
			.wrap(Condition::new(cors, Cors::permissive()))
			.wrap(Logger::default())
			.app_data(shared_data.clone())
			.configure(routes)
	})
		.bind(bind)?
		.run()
		.await
}
