use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::IntoResponse,
	routing::{get, put},
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
	extract::{Admin, Json},
	model::{ContactStatus, ContactSubmission},
	AppState, Database, Error,
};

pub fn routes() -> axum::Router<AppState> {
	axum::Router::new()
		.route("/", get(list).post(submit))
		.route("/:id/status", put(update_status))
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
	if value.trim().is_empty() {
		return Err(ValidationError::new("cannot be blank"));
	}

	Ok(())
}

#[derive(Deserialize, Validate)]
pub struct SubmitInput {
	#[validate(custom(function = "not_blank"))]
	pub name: String,
	#[validate(email)]
	pub email: String,
	#[validate(custom(function = "not_blank"))]
	pub subject: String,
	#[validate(custom(function = "not_blank"))]
	pub message: String,
}

#[derive(Deserialize, Validate)]
pub struct UpdateStatusInput {
	pub status: ContactStatus,
}

/// Persists a contact-form submission and notifies the owner.
///
/// Notification failures are logged and swallowed; the submission
/// succeeds regardless.
async fn submit(
	State(state): State<AppState>,
	Json(input): Json<SubmitInput>,
) -> Result<impl IntoResponse, Error> {
	let submission = sqlx::query_as::<_, ContactSubmission>(
		r#"
		INSERT INTO contact_submission (id, name, email, subject, message, status, created_at)
		VALUES (?, ?, ?, ?, ?, ?, ?)
		RETURNING *
		"#,
	)
	.bind(Uuid::new_v4())
	.bind(input.name.trim())
	.bind(input.email.trim())
	.bind(input.subject.trim())
	.bind(input.message.trim())
	.bind(ContactStatus::New)
	.bind(Utc::now())
	.fetch_one(&state.database)
	.await?;

	if let Err(error) = state.notifier.contact_submitted(&submission).await {
		tracing::warn!(%error, "contact notification failed");
	}

	Ok((StatusCode::CREATED, Json(submission)))
}

/// Returns all submissions, newest first.
async fn list(
	_admin: Admin,
	State(database): State<Database>,
) -> Result<Json<Vec<ContactSubmission>>, Error> {
	let submissions = sqlx::query_as::<_, ContactSubmission>(
		"SELECT * FROM contact_submission ORDER BY created_at DESC",
	)
	.fetch_all(&database)
	.await?;

	Ok(Json(submissions))
}

/// Updates the handling status of a submission.
async fn update_status(
	_admin: Admin,
	State(database): State<Database>,
	Path(id): Path<Uuid>,
	Json(input): Json<UpdateStatusInput>,
) -> Result<Json<ContactSubmission>, Error> {
	let submission = sqlx::query_as::<_, ContactSubmission>(
		"UPDATE contact_submission SET status = ? WHERE id = ? RETURNING *",
	)
	.bind(input.status)
	.bind(id)
	.fetch_optional(&database)
	.await?;

	Ok(Json(submission.ok_or(Error::NotFound("submission"))?))
}

#[cfg(test)]
mod test {
	use crate::test::*;

	fn submission() -> serde_json::Value {
		json!({
			"name": "Jane Doe",
			"email": "jane@example.com",
			"subject": "Hello",
			"message": "I would like to talk.",
		})
	}

	#[sqlx::test]
	async fn test_submit(pool: Database) {
		let app = app(pool).await;

		let response = app.post("/contact").json(&submission()).await;

		assert_eq!(response.status_code(), 201);

		let saved = response.json::<serde_json::Value>();

		assert_eq!(saved["status"], "new");
		assert_eq!(saved["email"], "jane@example.com");
	}

	#[sqlx::test]
	async fn test_submit_trims_fields(pool: Database) {
		let app = app(pool).await;

		let response = app
			.post("/contact")
			.json(&json!({
				"name": "  Jane Doe  ",
				"email": "jane@example.com",
				"subject": " Hello ",
				"message": " I would like to talk. ",
			}))
			.await;

		assert_eq!(response.status_code(), 201);

		let saved = response.json::<serde_json::Value>();

		assert_eq!(saved["name"], "Jane Doe");
		assert_eq!(saved["subject"], "Hello");
	}

	#[sqlx::test]
	async fn test_submit_validation(pool: Database) {
		let app = app(pool).await;

		// Missing email entirely.
		let mut body = submission();
		body.as_object_mut().unwrap().remove("email");

		let response = app.post("/contact").json(&body).await;

		assert_eq!(response.status_code(), 400);

		let errors = response.json::<serde_json::Value>();

		assert!(errors["errors"].to_string().contains("email"));

		// Malformed email.
		let mut body = submission();
		body["email"] = json!("not-an-email");

		let response = app.post("/contact").json(&body).await;

		assert_eq!(response.status_code(), 400);
		assert!(response.json::<serde_json::Value>()["errors"]
			.to_string()
			.contains("email"));

		// Blank message.
		let mut body = submission();
		body["message"] = json!("   ");

		let response = app.post("/contact").json(&body).await;

		assert_eq!(response.status_code(), 400);
	}

	#[sqlx::test]
	async fn test_list_requires_auth(pool: Database) {
		let app = app(pool).await;

		let response = app.get("/contact").await;

		assert_eq!(response.status_code(), 401);
	}

	#[sqlx::test]
	async fn test_list_and_update_status(pool: Database) {
		let app = app(pool).await;
		let token = authorize(&app).await;

		let response = app.post("/contact").json(&submission()).await;
		let id = response.json::<serde_json::Value>()["id"]
			.as_str()
			.unwrap()
			.to_owned();

		let response = app
			.get("/contact")
			.add_header(AUTHORIZATION, bearer(&token))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(
			response.json::<serde_json::Value>().as_array().unwrap().len(),
			1
		);

		let response = app
			.put(&format!("/contact/{id}/status"))
			.add_header(AUTHORIZATION, bearer(&token))
			.json(&json!({ "status": "read" }))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<serde_json::Value>()["status"], "read");

		let response = app
			.put(&format!("/contact/{}/status", uuid::Uuid::new_v4()))
			.add_header(AUTHORIZATION, bearer(&token))
			.json(&json!({ "status": "responded" }))
			.await;

		assert_eq!(response.status_code(), 404);
	}
}
