use uuid::Uuid;

use crate::Database;

/// An error produced while deriving a slug from a title.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Nothing survived normalization, e.g. a title of pure punctuation.
	#[error("must contain at least one word character")]
	Empty,
}

/// Normalizes a title into a candidate slug: lower-cased, word characters
/// only, runs of whitespace and hyphens collapsed into a single hyphen,
/// no leading or trailing hyphen.
///
/// Returns [`None`] when nothing survives normalization.
pub fn slugify(title: &str) -> Option<String> {
	let mut slug = String::with_capacity(title.len());

	for c in title.chars() {
		if c.is_ascii_alphanumeric() || c == '_' {
			slug.push(c.to_ascii_lowercase());
		} else if (c.is_whitespace() || c == '-') && !slug.is_empty() && !slug.ends_with('-') {
			slug.push('-');
		}
	}

	if slug.ends_with('-') {
		slug.pop();
	}

	if slug.is_empty() {
		None
	} else {
		Some(slug)
	}
}

/// Derives a unique slug for `title`, probing storage and appending a
/// numeric suffix (`-1`, `-2`, ...) until an unused candidate is found.
///
/// `exclude` is the id of the post being updated, so a post never
/// collides with its own current slug. This function only reads; a race
/// with a concurrent writer is caught by the UNIQUE constraint on
/// `post.slug` at write time instead.
pub async fn assign(
	database: &Database,
	title: &str,
	exclude: Option<Uuid>,
) -> Result<String, crate::Error> {
	let base = slugify(title).ok_or(Error::Empty)?;

	let mut candidate = base.clone();
	let mut counter = 1u64;

	loop {
		if !taken(database, &candidate, exclude).await? {
			return Ok(candidate);
		}

		candidate = format!("{base}-{counter}");
		counter += 1;
	}
}

async fn taken(database: &Database, slug: &str, exclude: Option<Uuid>) -> Result<bool, sqlx::Error> {
	match exclude {
		Some(id) => {
			sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM post WHERE slug = ? AND id <> ?)")
				.bind(slug)
				.bind(id)
				.fetch_one(database)
				.await
		}
		None => {
			sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM post WHERE slug = ?)")
				.bind(slug)
				.fetch_one(database)
				.await
		}
	}
}
