use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
	Json,
};
use serde::Serialize;

use crate::{route::auth, slug};

/// Error type for the application.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0}")]
	Json(#[from] rejection::JsonRejection),
	#[error("auth error: {0}")]
	Auth(#[from] auth::Error),
	#[error("slug error: {0}")]
	Slug(#[from] slug::Error),
	#[error("{0} not found")]
	NotFound(&'static str),
	#[error("slug already in use")]
	DuplicateSlug,
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub success: bool,
	pub errors: Vec<String>,
}

impl IntoResponse for Error {
	fn into_response(self) -> Response<Body> {
		let (status, errors) = match self {
			Error::Validation(errors) => (
				StatusCode::BAD_REQUEST,
				errors
					.field_errors()
					.into_iter()
					.flat_map(|(field, errors)| {
						errors
							.iter()
							.map(move |error| format!("{field}: {error}"))
					})
					.collect(),
			),
			Error::Json(error) => (StatusCode::BAD_REQUEST, vec![error.to_string()]),
			// The slug is derived from the title, so surface it there.
			Error::Slug(error) => (StatusCode::BAD_REQUEST, vec![format!("title: {error}")]),
			Error::Auth(error) => {
				let status = error.status();

				// Never tell the caller which auth check failed; the
				// distinction only reaches the log.
				if status == StatusCode::UNAUTHORIZED {
					tracing::debug!(%error, "rejected credential");
					(status, vec!["not authorized".to_owned()])
				} else {
					tracing::error!(%error, "credential handling failed");
					(status, Vec::new())
				}
			}
			Error::NotFound(resource) => {
				(StatusCode::NOT_FOUND, vec![format!("{resource} not found")])
			}
			Error::DuplicateSlug => (
				StatusCode::CONFLICT,
				vec!["slug already in use".to_owned()],
			),
			Error::Database(error) => {
				tracing::error!(%error, "unexpected database error");
				(StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
			}
		};

		(
			status,
			Json(ErrorResponse {
				success: false,
				errors,
			}),
		)
			.into_response()
	}
}
