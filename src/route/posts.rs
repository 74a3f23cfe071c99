use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::IntoResponse,
	routing::get,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
	config::Config,
	extract::{Admin, Json},
	model, slug, AppState, Database, Error,
};

pub fn routes() -> axum::Router<AppState> {
	axum::Router::new()
		.route("/", get(list_published).post(create_post))
		.route("/admin/all", get(list_all))
		.route(
			"/:slug",
			get(get_by_slug).put(update_post).delete(delete_post),
		)
}

#[derive(Deserialize, Validate)]
pub struct CreatePostInput {
	#[validate(length(min = 1, max = 256))]
	pub title: String,
	#[validate(length(min = 1))]
	pub content: String,
	#[validate(length(min = 1, max = 200))]
	pub excerpt: String,
	#[serde(default)]
	pub tags: Vec<String>,
	pub image: Option<String>,
	pub published: Option<bool>,
}

#[derive(Deserialize, Validate)]
pub struct UpdatePostInput {
	#[validate(length(min = 1, max = 256))]
	pub title: Option<String>,
	#[validate(length(min = 1))]
	pub content: Option<String>,
	#[validate(length(min = 1, max = 200))]
	pub excerpt: Option<String>,
	pub tags: Option<Vec<String>>,
	pub image: Option<String>,
	pub published: Option<bool>,
}

/// Returns all published posts, newest first.
async fn list_published(
	State(database): State<Database>,
) -> Result<Json<Vec<model::Post>>, Error> {
	let posts = sqlx::query_as::<_, model::Post>(
		"SELECT * FROM post WHERE published = 1 ORDER BY created_at DESC",
	)
	.fetch_all(&database)
	.await?;

	Ok(Json(posts))
}

/// Returns every post regardless of published state, newest first.
async fn list_all(
	_admin: Admin,
	State(database): State<Database>,
) -> Result<Json<Vec<model::Post>>, Error> {
	let posts = sqlx::query_as::<_, model::Post>("SELECT * FROM post ORDER BY created_at DESC")
		.fetch_all(&database)
		.await?;

	Ok(Json(posts))
}

/// Returns a single published post by its slug, counting the read.
///
/// The increment happens in the same statement as the fetch, so
/// concurrent reads each count exactly once.
async fn get_by_slug(
	State(database): State<Database>,
	Path(slug): Path<String>,
) -> Result<Json<model::Post>, Error> {
	let post = sqlx::query_as::<_, model::Post>(
		"UPDATE post SET views = views + 1 WHERE slug = ? AND published = 1 RETURNING *",
	)
	.bind(&slug)
	.fetch_optional(&database)
	.await?;

	Ok(Json(post.ok_or(Error::NotFound("post"))?))
}

/// Creates a new post, deriving a unique slug from its title.
async fn create_post(
	State(state): State<AppState>,
	_admin: Admin,
	Json(input): Json<CreatePostInput>,
) -> Result<impl IntoResponse, Error> {
	let slug = slug::assign(&state.database, &input.title, None).await?;

	let post = match insert_post(&state.database, &state.config, &input, &slug).await {
		// Lost a race with a concurrent create; re-derive once and retry.
		Err(error) if is_unique_violation(&error) => {
			let slug = slug::assign(&state.database, &input.title, None).await?;

			insert_post(&state.database, &state.config, &input, &slug)
				.await
				.map_err(|error| {
					if is_unique_violation(&error) {
						Error::DuplicateSlug
					} else {
						Error::Database(error)
					}
				})?
		}
		result => result?,
	};

	Ok((StatusCode::CREATED, Json(post)))
}

/// Applies a partial update, recomputing the slug only when the incoming
/// title differs from the stored one.
async fn update_post(
	State(state): State<AppState>,
	_admin: Admin,
	Path(id): Path<Uuid>,
	Json(input): Json<UpdatePostInput>,
) -> Result<Json<model::Post>, Error> {
	let existing = sqlx::query_as::<_, model::Post>("SELECT * FROM post WHERE id = ?")
		.bind(id)
		.fetch_optional(&state.database)
		.await?
		.ok_or(Error::NotFound("post"))?;

	let slug = match &input.title {
		Some(title) if *title != existing.title => {
			slug::assign(&state.database, title, Some(id)).await?
		}
		_ => existing.slug.clone(),
	};

	let post = match apply_update(&state.database, &existing, &input, &slug).await {
		Err(error) if is_unique_violation(&error) => {
			let slug = match &input.title {
				Some(title) if *title != existing.title => {
					slug::assign(&state.database, title, Some(id)).await?
				}
				_ => existing.slug.clone(),
			};

			apply_update(&state.database, &existing, &input, &slug)
				.await
				.map_err(|error| {
					if is_unique_violation(&error) {
						Error::DuplicateSlug
					} else {
						Error::Database(error)
					}
				})?
		}
		result => result?,
	};

	Ok(Json(post))
}

/// Deletes a post by its unique id.
async fn delete_post(
	State(database): State<Database>,
	_admin: Admin,
	Path(id): Path<Uuid>,
) -> Result<StatusCode, Error> {
	let result = sqlx::query("DELETE FROM post WHERE id = ?")
		.bind(id)
		.execute(&database)
		.await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound("post"));
	}

	Ok(StatusCode::NO_CONTENT)
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
	matches!(error, sqlx::Error::Database(e) if e.is_unique_violation())
}

async fn insert_post(
	database: &Database,
	config: &Config,
	input: &CreatePostInput,
	slug: &str,
) -> Result<model::Post, sqlx::Error> {
	let now = Utc::now();

	sqlx::query_as::<_, model::Post>(
		r#"
		INSERT INTO post (id, title, content, excerpt, author, tags, image, published, views, slug, created_at, updated_at)
		VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?)
		RETURNING *
		"#,
	)
	.bind(Uuid::new_v4())
	.bind(&input.title)
	.bind(&input.content)
	.bind(&input.excerpt)
	.bind(&config.owner_name)
	.bind(sqlx::types::Json(&input.tags))
	.bind(input.image.as_deref())
	.bind(input.published.unwrap_or(true))
	.bind(slug)
	.bind(now)
	.bind(now)
	.fetch_one(database)
	.await
}

async fn apply_update(
	database: &Database,
	existing: &model::Post,
	input: &UpdatePostInput,
	slug: &str,
) -> Result<model::Post, sqlx::Error> {
	sqlx::query_as::<_, model::Post>(
		r#"
		UPDATE post
		SET title = ?, content = ?, excerpt = ?, tags = ?, image = ?, published = ?, slug = ?, updated_at = ?
		WHERE id = ?
		RETURNING *
		"#,
	)
	.bind(input.title.as_deref().unwrap_or(&existing.title))
	.bind(input.content.as_deref().unwrap_or(&existing.content))
	.bind(input.excerpt.as_deref().unwrap_or(&existing.excerpt))
	.bind(sqlx::types::Json(
		input.tags.as_ref().unwrap_or(&existing.tags.0),
	))
	.bind(input.image.as_deref().or(existing.image.as_deref()))
	.bind(input.published.unwrap_or(existing.published))
	.bind(slug)
	.bind(Utc::now())
	.bind(existing.id)
	.fetch_one(database)
	.await
}
