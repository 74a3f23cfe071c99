use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::route::auth;

/// Claims embedded in an issued credential.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
	/// The administrator id.
	pub sub: Uuid,
	/// The administrator email.
	pub email: String,
	/// Issued-at, in seconds since the epoch.
	pub iat: i64,
	/// Expiry, in seconds since the epoch.
	pub exp: i64,
}

/// A signed, time-bound bearer credential, as returned from login.
#[derive(Debug, Serialize)]
pub struct Credential {
	pub token: String,
	pub expires_at: DateTime<Utc>,
}

/// Signing and verification keys for the bearer credential, plus its
/// time-to-live. Both keys derive from one process-wide secret.
///
/// The credential is self-contained: there is no server-side session
/// store and no revocation, so the only way a credential stops being
/// valid is by reaching its expiry.
#[derive(Clone)]
pub struct Keys {
	encoding: EncodingKey,
	decoding: DecodingKey,
	ttl_secs: i64,
}

impl Keys {
	pub fn new(secret: &str, ttl_secs: i64) -> Self {
		Self {
			encoding: EncodingKey::from_secret(secret.as_bytes()),
			decoding: DecodingKey::from_secret(secret.as_bytes()),
			ttl_secs,
		}
	}

	/// Issues a signed credential for the administrator, expiring after
	/// the configured time-to-live.
	pub fn issue(&self, id: Uuid, email: &str) -> Result<Credential, auth::Error> {
		let issued_at = Utc::now();
		let expires_at = issued_at + chrono::Duration::seconds(self.ttl_secs);

		let claims = Claims {
			sub: id,
			email: email.to_owned(),
			iat: issued_at.timestamp(),
			exp: expires_at.timestamp(),
		};

		let token = encode(&Header::default(), &claims, &self.encoding)?;

		Ok(Credential { token, expires_at })
	}

	/// Verifies a credential's signature and expiry, returning its claims.
	pub fn verify(&self, token: &str) -> Result<Claims, auth::Error> {
		let mut validation = Validation::default();
		validation.leeway = 0;

		decode::<Claims>(token, &self.decoding, &validation)
			.map(|data| data.claims)
			.map_err(|error| match error.kind() {
				ErrorKind::ExpiredSignature => auth::Error::ExpiredCredential,
				_ => auth::Error::InvalidCredential,
			})
	}
}

#[cfg(test)]
mod test {
	use super::*;

	const SECRET: &str = "test-secret";

	#[test]
	fn test_issue_then_verify() {
		let keys = Keys::new(SECRET, 3600);
		let id = Uuid::new_v4();

		let credential = keys.issue(id, "admin@example.com").unwrap();
		let claims = keys.verify(&credential.token).unwrap();

		assert_eq!(claims.sub, id);
		assert_eq!(claims.email, "admin@example.com");
		assert_eq!(claims.exp, credential.expires_at.timestamp());
	}

	#[test]
	fn test_expired_credential() {
		let keys = Keys::new(SECRET, -120);
		let credential = keys.issue(Uuid::new_v4(), "admin@example.com").unwrap();

		assert!(matches!(
			keys.verify(&credential.token),
			Err(auth::Error::ExpiredCredential)
		));
	}

	#[test]
	fn test_tampered_signature() {
		let keys = Keys::new(SECRET, 3600);
		let other = Keys::new("a-different-secret", 3600);

		let credential = other.issue(Uuid::new_v4(), "admin@example.com").unwrap();

		assert!(matches!(
			keys.verify(&credential.token),
			Err(auth::Error::InvalidCredential)
		));
	}

	#[test]
	fn test_malformed_credential() {
		let keys = Keys::new(SECRET, 3600);

		assert!(matches!(
			keys.verify("not-a-credential"),
			Err(auth::Error::InvalidCredential)
		));
	}
}
