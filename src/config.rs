use std::env;

/// Fallback session secret for local development only.
const LOCAL_SESSION_SECRET: &str = "ems-console-local-session-secret";
/// Eight hours, one working day.
const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 60 * 60;
/// Longest accepted session lifetime, 30 days.
pub const MAX_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// AppConfig
///
/// Holds the console gateway's entire configuration. Loaded once at startup and never mutated;
/// handlers and the session extractor pull it out of the application state via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Base URL of the EMS REST backend (the login endpoint and the API proxy target).
    pub api_base_url: String,
    // HS256 secret used to sign and verify session tokens.
    pub session_secret: String,
    // Lifetime of an issued session token.
    pub session_ttl_secs: u64,
    // Adds the `Secure` attribute to the session cookie.
    pub cookie_secure: bool,
    // Where the view shells load the client bundle from.
    pub asset_base_url: String,
    pub bind_addr: String,
    // Runtime environment marker. Controls the development session bypass.
    pub env: Env,
}

/// Env
///
/// The runtime context. `Local` enables development conveniences (header session bypass,
/// default secrets); `Production` requires every secret to be set explicitly.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking values for test state setup.
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            session_secret: LOCAL_SESSION_SECRET.to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            cookie_secure: false,
            asset_base_url: "/assets".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in `Production` when `EMS_API_URL` or `EMS_SESSION_SECRET` is missing, and in any
    /// environment when `EMS_SESSION_TTL_SECS` is set but is not an integer between 1 and
    /// `MAX_SESSION_TTL_SECS`. The process must not start with an incomplete or insecure
    /// configuration.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let session_ttl_secs = match env::var("EMS_SESSION_TTL_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|ttl| (1..=MAX_SESSION_TTL_SECS).contains(ttl))
                .expect("FATAL: EMS_SESSION_TTL_SECS must be between 1 and 2592000 seconds."),
            Err(_) => DEFAULT_SESSION_TTL_SECS,
        };

        let asset_base_url =
            env::var("EMS_ASSET_BASE_URL").unwrap_or_else(|_| "/assets".to_string());
        let bind_addr = env::var("EMS_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        match env {
            Env::Local => Self {
                api_base_url: env::var("EMS_API_URL")
                    .unwrap_or_else(|_| "http://localhost:8000".to_string()),
                session_secret: env::var("EMS_SESSION_SECRET")
                    .unwrap_or_else(|_| LOCAL_SESSION_SECRET.to_string()),
                session_ttl_secs,
                cookie_secure: false,
                asset_base_url,
                bind_addr,
                env: Env::Local,
            },
            Env::Production => Self {
                api_base_url: env::var("EMS_API_URL")
                    .expect("FATAL: EMS_API_URL required in prod"),
                session_secret: env::var("EMS_SESSION_SECRET")
                    .expect("FATAL: EMS_SESSION_SECRET must be set in production."),
                session_ttl_secs,
                cookie_secure: true,
                asset_base_url,
                bind_addr,
                env: Env::Production,
            },
        }
    }
}
