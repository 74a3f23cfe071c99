use axum::{
	body::Body,
	extract::{FromRef, FromRequest, FromRequestParts, Request},
	http::{header, request, Response},
	response::IntoResponse,
};
use serde::{de, Serialize};
use uuid::Uuid;

use crate::{error::Error, route::auth, token::Keys};

/// Extractor that deserializes a JSON body and validates it.
pub struct Json<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
	T: de::DeserializeOwned + validator::Validate,
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let result = axum::extract::Json::<T>::from_request(req, state).await?.0;

		result.validate().map_err(Error::Validation)?;
		Ok(Self(result))
	}
}

impl<T> IntoResponse for Json<T>
where
	T: serde::Serialize,
{
	fn into_response(self) -> Response<Body> {
		axum::extract::Json(self.0).into_response()
	}
}

/// The scheme expected in the `Authorization` header.
pub const AUTHORIZATION_PREFIX: &str = "Bearer ";

/// The administrator identity, extracted from a bearer credential.
///
/// The credential is self-contained, so no session state is consulted.
/// A missing header is an [`auth::Error::MissingCredential`], anything
/// that fails to verify is an [`auth::Error::InvalidCredential`] and a
/// credential past its expiry is an [`auth::Error::ExpiredCredential`].
#[derive(Debug, Serialize)]
pub struct Admin {
	pub id: Uuid,
	pub email: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Admin
where
	Keys: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = Error;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let header = parts
			.headers
			.get(header::AUTHORIZATION)
			.ok_or(auth::Error::MissingCredential)?;

		let header = header
			.to_str()
			.map_err(|_| auth::Error::InvalidCredential)?;

		let Some(token) = header.strip_prefix(AUTHORIZATION_PREFIX) else {
			return Err(auth::Error::InvalidCredential.into());
		};

		let keys = Keys::from_ref(state);
		let claims = keys.verify(token)?;

		Ok(Self {
			id: claims.sub,
			email: claims.email,
		})
	}
}
