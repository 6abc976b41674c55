//! Server configuration
//!
//! All settings come from environment variables, read once at process
//! start into an explicit struct and passed into [`crate::core::ServerState`]
//! — there is no global env singleton.
//!
//! | Env var | Default | Meaning |
//! |---------|---------|---------|
//! | HTTP_PORT | 3000 | HTTP API port |
//! | DATABASE_PATH | petala.db | SQLite database file |
//! | ENVIRONMENT | development | development / staging / production |
//! | GATEWAY_URL | http://localhost:4000 | payment gateway base URL |
//! | GATEWAY_API_KEY | (empty) | payment gateway secret key |
//! | MESSAGING_URL | http://localhost:4001 | messaging gateway base URL |
//! | MESSAGING_TOKEN | (empty) | messaging client token |
//! | SCHEDULER_URL | http://localhost:4002 | external scheduler base URL |
//! | CALLBACK_BASE_URL | http://localhost:3000 | public base for webhook callbacks |
//! | CHECKOUT_BASE_URL | http://localhost:3000 | public base for card checkout links |
//! | COMPANY_CNPJ | (empty) | fixed CNPJ stamped on PIX_CNPJ payments |
//! | OFFER_TTL_MINUTES | 10 | supplier offer validity |
//! | PHOTO_WARN_LEAD_MINUTES | 60 | how early to warn about a missing photo |
//! | SWEEP_INTERVAL_SECS | 60 | panel expiry safety-sweep interval |

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub database_path: String,
    pub environment: String,

    // External collaborators
    pub gateway_url: String,
    pub gateway_api_key: String,
    pub messaging_url: String,
    pub messaging_token: String,
    pub scheduler_url: String,
    pub callback_base_url: String,

    // Payment rails
    pub checkout_base_url: String,
    pub company_cnpj: String,

    // Timers
    pub offer_ttl_minutes: i64,
    pub photo_warn_lead_minutes: i64,
    pub sweep_interval_secs: u64,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            http_port: env_parse("HTTP_PORT", 3000),
            database_path: env_or("DATABASE_PATH", "petala.db"),
            environment: env_or("ENVIRONMENT", "development"),

            gateway_url: env_or("GATEWAY_URL", "http://localhost:4000"),
            gateway_api_key: env_or("GATEWAY_API_KEY", ""),
            messaging_url: env_or("MESSAGING_URL", "http://localhost:4001"),
            messaging_token: env_or("MESSAGING_TOKEN", ""),
            scheduler_url: env_or("SCHEDULER_URL", "http://localhost:4002"),
            callback_base_url: env_or("CALLBACK_BASE_URL", "http://localhost:3000"),

            checkout_base_url: env_or("CHECKOUT_BASE_URL", "http://localhost:3000"),
            company_cnpj: env_or("COMPANY_CNPJ", ""),

            offer_ttl_minutes: env_parse("OFFER_TTL_MINUTES", 10),
            photo_warn_lead_minutes: env_parse("PHOTO_WARN_LEAD_MINUTES", 60),
            sweep_interval_secs: env_parse("SWEEP_INTERVAL_SECS", 60),
        }
    }

    /// Fixed defaults, independent of the environment. Used by tests.
    pub fn for_tests() -> Self {
        Self {
            http_port: 0,
            database_path: ":memory:".into(),
            environment: "test".into(),
            gateway_url: "http://gateway.test".into(),
            gateway_api_key: "sk_test".into(),
            messaging_url: "http://messaging.test".into(),
            messaging_token: "token".into(),
            scheduler_url: "http://scheduler.test".into(),
            callback_base_url: "http://hub.test".into(),
            checkout_base_url: "http://hub.test".into(),
            company_cnpj: "12.345.678/0001-90".into(),
            offer_ttl_minutes: 10,
            photo_warn_lead_minutes: 60,
            sweep_interval_secs: 60,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn offer_ttl_millis(&self) -> i64 {
        self.offer_ttl_minutes * 60 * 1000
    }

    pub fn photo_warn_lead_millis(&self) -> i64 {
        self.photo_warn_lead_minutes * 60 * 1000
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
