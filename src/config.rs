use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    /// `None` means session tokens never expire and only revocation ends them.
    pub ttl_minutes: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Falls back to the in-memory store when unset.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub cookie_domain: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "tutorhub".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "tutorhub-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|v| *v > 0),
        };
        let cookie_domain = std::env::var("COOKIE_DOMAIN").ok().filter(|v| !v.is_empty());
        Ok(Self {
            database_url,
            jwt,
            cookie_domain,
        })
    }

    /// Configuration used by tests and local experiments.
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: None,
            },
            cookie_domain: None,
        }
    }
}
