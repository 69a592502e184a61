use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_PATH: &str = "/api/v1";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_path: String,
    pub enable_swagger: bool,
}

/// Magic-link and session settings. `session_secret` signs the stateless
/// session tokens and must be set outside the debug profile.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub session_secret: String,
    pub session_ttl_days: i64,
    pub magic_link_ttl_seconds: i64,
    /// Frontend page that performs the redemption call; the emailed link
    /// points here with `?token=` appended.
    pub frontend_redeem_url: String,
    pub cookie_secure: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
    pub from_name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/daybook_db".to_string(),
            max_connections: 16,
            min_connections: 4,
            acquire_timeout: 5,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            address: "127.0.0.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allow_credentials: true,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_API_BASE_PATH.to_string(),
            enable_swagger: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: String::new(),
            session_ttl_days: 7,
            magic_link_ttl_seconds: 15 * 60,
            frontend_redeem_url: "http://localhost:3000/login/redeem".to_string(),
            cookie_secure: true,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: "no-reply@daybook.local".to_string(),
            from_name: "Daybook".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Daybook.toml (base configuration file)
    /// 2. Environment variables (prefixed with DAYBOOK_, `__` as separator)
    /// 3. DATABASE_URL and SESSION_SECRET environment variables
    pub fn load() -> Result<Self, figment::Error> {
        let figment = Figment::new()
            // Start with defaults
            .merge(Toml::string(&toml::to_string(&Config::default()).unwrap()).nested())
            // Layer on Daybook.toml if it exists
            .merge(Toml::file("Daybook.toml").nested())
            // Layer on environment variables (e.g., DAYBOOK_DATABASE__URL)
            .merge(Env::prefixed("DAYBOOK_").split("__"))
            // Escape hatches for the two values every deployment sets
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()))
            .merge(Env::raw().only(&["SESSION_SECRET"]).map(|_| "auth.session_secret".into()));

        figment.extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.auth.session_ttl_days, 7);
        assert_eq!(config.auth.magic_link_ttl_seconds, 900);
        assert_eq!(config.api.base_path, DEFAULT_API_BASE_PATH);
        assert!(config.auth.session_secret.is_empty());
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        // Config::load seeds the figment from the serialized defaults, so
        // they must survive a toml round trip.
        let serialized = toml::to_string(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.server.port, 8000);
        assert_eq!(parsed.database.max_connections, 16);
    }
}
