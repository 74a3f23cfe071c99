use argon2::Argon2;
use axum::{
	body::Body,
	extract::State,
	http::{Response, StatusCode},
	response::IntoResponse,
	routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
	config::Config,
	extract::{Admin, Json},
	model, AppState, Database,
};

pub const KEY_LENGTH: usize = 32;

pub fn routes() -> axum::Router<AppState> {
	axum::Router::new()
		.route("/login", post(login))
		.route("/verify", get(verify))
}

/// An error that can occur during authentication.
///
/// Every `UNAUTHORIZED` variant is collapsed into a single generic
/// response body; the individual messages only ever reach the log.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid email or password")]
	InvalidCredentials,
	#[error("no credential in authorization header")]
	MissingCredential,
	#[error("malformed or tampered credential")]
	InvalidCredential,
	#[error("expired credential")]
	ExpiredCredential,
	#[error("password hashing error")]
	Argon(#[from] argon2::Error),
	#[error("credential signing error: {0}")]
	Token(#[from] jsonwebtoken::errors::Error),
}

impl Error {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::InvalidCredentials
			| Self::MissingCredential
			| Self::InvalidCredential
			| Self::ExpiredCredential => StatusCode::UNAUTHORIZED,
			Self::Argon(..) | Self::Token(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response<Body> {
		crate::Error::from(self).into_response()
	}
}

#[derive(Deserialize, Validate)]
pub struct LoginInput {
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
}

/// Hashes a password with Argon2, using the administrator's id as a salt.
/// Since this is only used for logging in and seeding the account, the
/// scope of this function can remain in here with no issues.
fn hash_password(
	hasher: &Argon2,
	password: &str,
	id: &Uuid,
) -> Result<[u8; KEY_LENGTH], argon2::Error> {
	let mut hash = [0; KEY_LENGTH];

	hasher.hash_password_into(password.as_bytes(), id.as_bytes(), &mut hash)?;
	Ok(hash)
}

/// Returns a signed bearer credential, assuming the credentials are valid.
async fn login(
	State(state): State<AppState>,
	Json(auth): Json<LoginInput>,
) -> Result<impl IntoResponse, crate::Error> {
	let admin = sqlx::query_as::<_, model::Admin>("SELECT * FROM admin WHERE email = ?")
		.bind(&auth.email)
		.fetch_optional(&state.database)
		.await?;

	let Some(admin) = admin else {
		return Err(Error::InvalidCredentials.into());
	};

	let hashed = hash_password(&state.hasher, &auth.password, &admin.id).map_err(Error::Argon)?;

	if admin.password != hashed {
		return Err(Error::InvalidCredentials.into());
	}

	let credential = state.keys.issue(admin.id, &admin.email)?;

	Ok(Json(credential))
}

/// Confirms the supplied credential is valid, returning the administrator
/// identity it encodes.
async fn verify(admin: Admin) -> impl IntoResponse {
	Json(admin)
}

/// Seeds the single administrator account from configuration.
///
/// Runs at process start. When a record already exists this is a no-op,
/// so repeated starts never create a second administrator.
pub async fn ensure_admin(
	database: &Database,
	hasher: &Argon2<'static>,
	config: &Config,
) -> Result<(), crate::Error> {
	let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM admin)")
		.fetch_one(database)
		.await?;

	if exists {
		return Ok(());
	}

	let id = Uuid::new_v4();
	let password = hash_password(hasher, &config.admin_password, &id).map_err(Error::Argon)?;

	sqlx::query("INSERT INTO admin (id, email, password, name, created_at) VALUES (?, ?, ?, ?, ?)")
		.bind(id)
		.bind(&config.admin_email)
		.bind(password.to_vec())
		.bind(&config.owner_name)
		.bind(Utc::now())
		.execute(database)
		.await?;

	tracing::info!(email = %config.admin_email, "seeded administrator account");

	Ok(())
}

#[cfg(test)]
mod test {
	use uuid::Uuid;

	use crate::test::*;

	#[sqlx::test]
	async fn test_login_flow(pool: Database) {
		let app = app(pool).await;

		let response = app
			.post("/auth/login")
			.json(&json!({
				"email": "nobody@example.com",
				"password": ADMIN_PASSWORD,
			}))
			.await;

		assert_eq!(response.status_code(), 401);

		let response = app
			.post("/auth/login")
			.json(&json!({
				"email": ADMIN_EMAIL,
				"password": "definitely-wrong",
			}))
			.await;

		assert_eq!(response.status_code(), 401);

		let response = app
			.post("/auth/login")
			.json(&json!({
				"email": ADMIN_EMAIL,
				"password": ADMIN_PASSWORD,
			}))
			.await;

		assert_eq!(response.status_code(), 200);

		let credential = response.json::<serde_json::Value>();

		assert!(credential["token"].is_string());
		assert!(credential["expires_at"].is_string());
	}

	#[sqlx::test]
	async fn test_verify(pool: Database) {
		let app = app(pool).await;
		let token = authorize(&app).await;

		let response = app
			.get("/auth/verify")
			.add_header(AUTHORIZATION, bearer(&token))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<serde_json::Value>()["email"], ADMIN_EMAIL);
	}

	#[sqlx::test]
	async fn test_verify_rejections(pool: Database) {
		let app = app(pool).await;

		// No credential at all.
		let response = app.get("/auth/verify").await;

		assert_eq!(response.status_code(), 401);

		// Tampered signature.
		let mut token = authorize(&app).await;
		token.push('x');

		let response = app
			.get("/auth/verify")
			.add_header(AUTHORIZATION, bearer(&token))
			.await;

		assert_eq!(response.status_code(), 401);

		// Expired, but correctly signed.
		let keys = crate::token::Keys::new(TOKEN_SECRET, -120);
		let credential = keys.issue(Uuid::new_v4(), ADMIN_EMAIL).unwrap();

		let response = app
			.get("/auth/verify")
			.add_header(AUTHORIZATION, bearer(&credential.token))
			.await;

		assert_eq!(response.status_code(), 401);

		// Wrong scheme.
		let token = authorize(&app).await;

		let response = app
			.get("/auth/verify")
			.add_header(AUTHORIZATION, token.parse().unwrap())
			.await;

		assert_eq!(response.status_code(), 401);
	}

	#[sqlx::test]
	async fn test_bootstrap_is_idempotent(pool: Database) {
		// `app` seeds the account once; seed again explicitly.
		let _ = app(pool.clone()).await;

		crate::route::auth::ensure_admin(&pool, &argon2::Argon2::default(), &config())
			.await
			.unwrap();

		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin")
			.fetch_one(&pool)
			.await
			.unwrap();

		assert_eq!(count, 1);
	}
}
