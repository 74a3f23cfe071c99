/// Environment-derived configuration, read once at startup.
pub struct Config {
	pub database_url: String,
	pub port: u16,
	pub admin_email: String,
	pub admin_password: String,
	pub token_secret: String,
	pub token_ttl_secs: i64,
	pub owner_name: String,
	pub frontend_origin: Option<String>,
}

impl Config {
	/// Reads the configuration from the environment.
	///
	/// `DATABASE_URL` and `TOKEN_SECRET` are required; everything else
	/// falls back to a development default.
	pub fn from_env() -> Self {
		Self {
			database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
			port: std::env::var("PORT").map_or_else(
				|_| 3000,
				|port| port.parse().expect("PORT must be a number"),
			),
			admin_email: var_or("ADMIN_EMAIL", "admin@example.com"),
			admin_password: std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
				tracing::warn!("ADMIN_PASSWORD not set, using the development default");
				"admin123".to_owned()
			}),
			token_secret: std::env::var("TOKEN_SECRET").expect("TOKEN_SECRET must be set"),
			token_ttl_secs: std::env::var("TOKEN_TTL_SECS").map_or_else(
				|_| 86_400,
				|ttl| ttl.parse().expect("TOKEN_TTL_SECS must be a number"),
			),
			owner_name: var_or("OWNER_NAME", "Site Owner"),
			frontend_origin: std::env::var("FRONTEND_ORIGIN").ok(),
		}
	}
}

fn var_or(key: &str, default: &str) -> String {
	std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
