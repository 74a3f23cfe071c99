use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// A single blog post.
///
/// Use this when fetching from the database and returning to the client.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Post {
	pub id: Uuid,
	pub title: String,
	/// The content of the post in Markdown format.
	pub content: String,
	pub excerpt: String,
	pub author: String,
	pub tags: Json<Vec<String>>,
	pub image: Option<String>,
	pub published: bool,
	pub views: i64,
	/// URL-safe identifier derived from the title, unique across all posts.
	pub slug: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// The single administrator account.
///
/// The `email` and `password` fields are not serialized to the client.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Admin {
	pub id: Uuid,
	#[serde(skip_serializing)]
	pub email: String,
	/// argon2 and salted with `id`
	#[serde(skip_serializing)]
	pub password: Vec<u8>,
	pub name: String,
	pub created_at: DateTime<Utc>,
}

/// Handling state of a contact submission, settable by the administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ContactStatus {
	New,
	Read,
	Responded,
}

/// A message submitted through the public contact form.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ContactSubmission {
	pub id: Uuid,
	pub name: String,
	pub email: String,
	pub subject: String,
	pub message: String,
	pub status: ContactStatus,
	pub created_at: DateTime<Utc>,
}
