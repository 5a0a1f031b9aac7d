use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Context;
use log::info;
use serde::Deserialize;

use kgrams_core::dict_builder;
use kgrams_core::dictionary::Dictionary;
use kgrams_core::model::KgramFreqs;
use kgrams_core::preprocess::Preprocessor;
use kgrams_core::sampler::Sampler;
use kgrams_core::smoothing::{self, AbsoluteDiscount, AddK, KneserNey, Ml, ModifiedKneserNey, Smoother, StupidBackoff, WittenBell};
use kgrams_core::tokenizer::SentenceTokenizer;

#[derive(Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SmootherKind {
	Ml,
	AddK,
	StupidBackoff,
	AbsoluteDiscount,
	WittenBell,
	KneserNey,
	ModifiedKneserNey,
}

impl Default for SmootherKind {
	fn default() -> Self {
		SmootherKind::ModifiedKneserNey
	}
}

/// Parameters a trained model was built with, kept around so a fresh
/// smoother can be rebuilt for every request without re-parsing a query.
#[derive(Clone, Copy)]
struct SmootherConfig {
	kind: SmootherKind,
	add_k: f64,
	lambda: f64,
	discount: f64,
	d1: f64,
	d2: f64,
	d3_plus: f64,
}

impl Default for SmootherConfig {
	fn default() -> Self {
		Self { kind: SmootherKind::default(), add_k: 1.0, lambda: 0.4, discount: 0.75, d1: 0.5, d2: 1.0, d3_plus: 1.5 }
	}
}

/// Builds the configured smoother against `freqs`, clearing any
/// previously registered satellites first so repeated rebuilds don't
/// accumulate stale ones.
fn build_smoother(freqs: &mut KgramFreqs, config: SmootherConfig) -> kgrams_core::Result<Box<dyn Smoother + '_>> {
	freqs.clear_satellites();
	Ok(match config.kind {
		SmootherKind::Ml => Box::new(Ml::new(freqs)?),
		SmootherKind::AddK => Box::new(AddK::new(freqs, config.add_k)?),
		SmootherKind::StupidBackoff => Box::new(StupidBackoff::new(freqs, config.lambda)?),
		SmootherKind::AbsoluteDiscount => Box::new(AbsoluteDiscount::new(freqs, config.discount)?),
		SmootherKind::WittenBell => Box::new(WittenBell::new(freqs)?),
		SmootherKind::KneserNey => Box::new(KneserNey::new(freqs, config.discount)?),
		SmootherKind::ModifiedKneserNey => Box::new(ModifiedKneserNey::new(freqs, config.d1, config.d2, config.d3_plus)?),
	})
}

struct TrainedModel {
	freqs: KgramFreqs,
	config: SmootherConfig,
}

struct SharedData {
	model: Option<TrainedModel>,
}

#[derive(Deserialize)]
struct TrainParams {
	order: Option<usize>,
	#[serde(default)]
	smoother: Option<SmootherKind>,
	add_k: Option<f64>,
	lambda: Option<f64>,
	discount: Option<f64>,
	d1: Option<f64>,
	d2: Option<f64>,
	d3_plus: Option<f64>,
	lower_case: Option<bool>,
	vocab_size: Option<usize>,
}

/// HTTP PUT `/v1/train`
///
/// Trains a fresh model from the request body (one sentence, or a
/// punctuation-delimited block of several, per line), replacing
/// whatever model was previously loaded.
#[put("/v1/train")]
async fn train(data: web::Data<Mutex<SharedData>>, query: web::Query<TrainParams>, body: web::Bytes) -> impl Responder {
	let text = match std::str::from_utf8(&body) {
		Ok(t) => t,
		Err(_) => return HttpResponse::BadRequest().body("request body must be UTF-8 text"),
	};

	let order = query.order.unwrap_or(3);
	let lower_case = query.lower_case.unwrap_or(false);
	let preprocessor = Preprocessor::with_defaults(lower_case);
	let tokenizer = SentenceTokenizer::with_defaults(false);

	let mut sentences = Vec::new();
	for line in text.lines() {
		let cleaned = preprocessor.process(line);
		sentences.extend(tokenizer.split(&cleaned));
	}
	if sentences.is_empty() {
		return HttpResponse::BadRequest().body("no sentences found in request body");
	}

	let fixed_dictionary = query.vocab_size.is_some();
	let mut freqs = match query.vocab_size {
		Some(vocab_size) => {
			let word_freqs = dict_builder::word_frequencies(&sentences);
			let words = dict_builder::top_n(&word_freqs, vocab_size);
			KgramFreqs::with_dictionary(order, Dictionary::with_words(words))
		}
		None => KgramFreqs::new(order),
	};
	freqs.process_sentences(&sentences, fixed_dictionary);

	let config = SmootherConfig {
		kind: query.smoother.unwrap_or_default(),
		add_k: query.add_k.unwrap_or(1.0),
		lambda: query.lambda.unwrap_or(0.4),
		discount: query.discount.unwrap_or(0.75),
		d1: query.d1.unwrap_or(0.5),
		d2: query.d2.unwrap_or(1.0),
		d3_plus: query.d3_plus.unwrap_or(1.5),
	};

	// Build once to validate the configuration before committing it.
	if let Err(e) = build_smoother(&mut freqs, config) {
		return HttpResponse::BadRequest().body(e.to_string());
	}

	info!("trained model: order={} V={} tokens={}", freqs.n(), freqs.v(), freqs.tot_words());

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("model lock failed"),
	};
	shared_data.model = Some(TrainedModel { freqs, config });

	HttpResponse::Ok().body("model trained")
}

/// HTTP GET `/v1/info`
///
/// Reports the shape of the currently loaded model, if any.
#[get("/v1/info")]
async fn info(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("model lock failed"),
	};
	match &shared_data.model {
		Some(m) => HttpResponse::Ok().body(format!("order={} vocab_size={} tokens={}", m.freqs.n(), m.freqs.v(), m.freqs.tot_words())),
		None => HttpResponse::NotFound().body("no model loaded"),
	}
}

#[derive(Deserialize)]
struct ProbabilityParams {
	word: String,
	#[serde(default)]
	context: String,
}

/// HTTP GET `/v1/probability`
///
/// `P(word | context)` under the loaded model's smoother.
#[get("/v1/probability")]
async fn probability(data: web::Data<Mutex<SharedData>>, query: web::Query<ProbabilityParams>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("model lock failed"),
	};
	let model = match &mut shared_data.model {
		Some(m) => m,
		None => return HttpResponse::NotFound().body("no model loaded"),
	};
	let smoother = match build_smoother(&mut model.freqs, model.config) {
		Ok(s) => s,
		Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
	};
	let p = smoother.probability(&query.word, &query.context);
	HttpResponse::Ok().body(p.to_string())
}

#[derive(Deserialize)]
struct SampleParams {
	count: Option<usize>,
	max_length: Option<usize>,
	temperature: Option<f64>,
}

/// HTTP GET `/v1/sample`
///
/// Samples `count` sentences from the loaded model via the Gumbel-Max
/// trick, one per line.
#[get("/v1/sample")]
async fn sample(data: web::Data<Mutex<SharedData>>, query: web::Query<SampleParams>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("model lock failed"),
	};
	let model = match &mut shared_data.model {
		Some(m) => m,
		None => return HttpResponse::NotFound().body("no model loaded"),
	};
	let smoother = match build_smoother(&mut model.freqs, model.config) {
		Ok(s) => s,
		Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
	};
	let temperature = query.temperature.unwrap_or(1.0);
	let sampler = match Sampler::new(smoother.as_ref(), temperature) {
		Ok(s) => s,
		Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
	};
	let count = query.count.unwrap_or(1);
	let max_length = query.max_length.unwrap_or(20);
	let sentences: Vec<String> = (0..count).map(|_| sampler.sample_sentence(max_length)).collect();
	HttpResponse::Ok().body(sentences.join("\n"))
}

#[derive(Deserialize)]
struct ScoreParams {
	log: Option<bool>,
}

/// HTTP PUT `/v1/score`
///
/// Reports cross-entropy and perplexity of the request body (one
/// sentence per line) under the loaded model.
#[put("/v1/score")]
async fn score(data: web::Data<Mutex<SharedData>>, query: web::Query<ScoreParams>, body: web::Bytes) -> impl Responder {
	let text = match std::str::from_utf8(&body) {
		Ok(t) => t,
		Err(_) => return HttpResponse::BadRequest().body("request body must be UTF-8 text"),
	};
	let sentences: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
	if sentences.is_empty() {
		return HttpResponse::BadRequest().body("no sentences found in request body");
	}

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("model lock failed"),
	};
	let model = match &mut shared_data.model {
		Some(m) => m,
		None => return HttpResponse::NotFound().body("no model loaded"),
	};
	let smoother = match build_smoother(&mut model.freqs, model.config) {
		Ok(s) => s,
		Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
	};

	if query.log.unwrap_or(false) {
		let lines: Vec<String> = sentences.iter().map(|s| format!("{:.6}", smoothing::score(smoother.as_ref(), s, true).0)).collect();
		return HttpResponse::Ok().body(lines.join("\n"));
	}

	let cross_entropy = smoothing::cross_entropy(smoother.as_ref(), &sentences);
	let perplexity = smoothing::perplexity(smoother.as_ref(), &sentences);
	HttpResponse::Ok().body(format!("cross_entropy={cross_entropy:.6}\nperplexity={perplexity:.6}"))
}

/// Main entry point for the server.
///
/// Holds at most one trained model in memory behind a `Mutex`, rebuilt
/// fresh on every query-serving request so the smoother configuration
/// chosen at training time always reflects the live counts.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
	env_logger::init();

	let shared_data = SharedData { model: None };
	let shared_model = web::Data::new(Mutex::new(shared_data));

	info!("listening on 127.0.0.1:5000");
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.service(train)
			.service(info)
			.service(probability)
			.service(sample)
			.service(score)
	})
	.bind(("127.0.0.1", 5000))
	.context("failed to bind to 127.0.0.1:5000")?
	.run()
	.await
	.context("server exited with an error")?;

	Ok(())
}
