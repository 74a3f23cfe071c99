#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod model;
mod notify;
mod route;
mod slug;
mod token;

use std::sync::Arc;

use argon2::Argon2;
use axum::{
	http::{header, HeaderValue},
	routing::get,
	Json, Router,
};
use tower_http::{
	cors::{self, CorsLayer},
	trace::TraceLayer,
};

use config::Config;
pub use error::Error;
use notify::{LogNotifier, Notifier};
use token::Keys;

pub type Database = sqlx::Pool<sqlx::Sqlite>;
pub type AppState = State;

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as the database connection pool, the credential keys, or a hash
/// configuration (if it's expensive to create).
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
	pub keys: Keys,
	pub notifier: Arc<dyn Notifier>,
	pub config: Arc<Config>,
}

/// Assembles the full router around the shared state.
fn app(state: State) -> Router {
	let cors = match state.config.frontend_origin.as_deref() {
		Some(origin) => CorsLayer::new().allow_origin(
			origin
				.parse::<HeaderValue>()
				.expect("FRONTEND_ORIGIN must be a valid origin"),
		),
		None => CorsLayer::new().allow_origin(cors::Any),
	}
	.allow_methods(cors::Any)
	.allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

	Router::new()
		.route("/health", get(health))
		.nest("/auth", route::auth::routes())
		.nest("/posts", route::posts::routes())
		.nest("/contact", route::contact::routes())
		.layer(TraceLayer::new_for_http())
		.layer(cors)
		.with_state(state)
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
	Json(serde_json::json!({ "status": "ok" }))
}

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt::init();
	dotenvy::dotenv().ok();

	let config = Config::from_env();

	let database = Database::connect(&config.database_url)
		.await
		.expect("failed to connect to database");

	sqlx::migrate!()
		.run(&database)
		.await
		.expect("failed to run migrations");

	let state = State {
		database,
		hasher: Argon2::default(),
		keys: Keys::new(&config.token_secret, config.token_ttl_secs),
		notifier: Arc::new(LogNotifier),
		config: Arc::new(config),
	};

	route::auth::ensure_admin(&state.database, &state.hasher, &state.config)
		.await
		.expect("failed to seed administrator account");

	let port = state.config.port;
	let app = app(state);

	let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
		.await
		.expect("failed to bind to port");

	tracing::info!("listening on port {}", port);

	axum::serve(listener, app).await.unwrap();
}
