use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub secret_key: String,
    pub auth_token_ttl_minutes: i64,
    pub link_token_max_age_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub sender: String,
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub tokens: TokenConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let tokens = TokenConfig {
            secret_key: std::env::var("SECRET_KEY")?,
            auth_token_ttl_minutes: std::env::var("AUTH_TOKEN_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            link_token_max_age_secs: std::env::var("LINK_TOKEN_MAX_AGE_SECS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(3600),
        };
        let mail = MailConfig {
            sender: std::env::var("MAIL_SENDER")
                .unwrap_or_else(|_| "no-reply@journal-api.local".into()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
        };
        Ok(Self {
            database_url,
            tokens,
            mail,
        })
    }
}
