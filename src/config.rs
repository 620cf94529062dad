use std::env;
use std::net::SocketAddr;

/// Minimum acceptable length for the session signing secret, in bytes.
///
/// A short HMAC secret is brute-forceable offline; the service refuses to
/// start rather than fall back to a weak or empty key.
pub const MIN_SESSION_SECRET_BYTES: usize = 32;

#[derive(Clone)]
pub struct Config {
    // Session tokens
    pub session_secret: String,
    pub session_max_age_secs: u64,
    pub session_renew_threshold_secs: u64,

    // Cookie
    pub cookie_name: String,
    pub cookie_secure: bool,

    // Server
    pub bind_addr: SocketAddr,
    pub base_url: String,

    // Password reset
    pub reset_token_ttl_secs: u64,
    pub reset_rate_limit_max: u32,
    pub reset_rate_limit_window_secs: u64,

    // Rate limiting
    pub rate_limit_auth_per_min: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("session_secret", &"[REDACTED]")
            .field("session_max_age_secs", &self.session_max_age_secs)
            .field(
                "session_renew_threshold_secs",
                &self.session_renew_threshold_secs,
            )
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("bind_addr", &self.bind_addr)
            .field("base_url", &self.base_url)
            .field("reset_token_ttl_secs", &self.reset_token_ttl_secs)
            .field("reset_rate_limit_max", &self.reset_rate_limit_max)
            .field(
                "reset_rate_limit_window_secs",
                &self.reset_rate_limit_window_secs,
            )
            .field("rate_limit_auth_per_min", &self.rate_limit_auth_per_min)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Failed to parse {0}: {1}")]
    ParseError(String, String),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Attempt to load .env file, but don't fail if it doesn't exist
        // (env vars may be set directly in production)
        let _ = dotenvy::dotenv();

        // Session secret is required and must clear the minimum-length bar.
        // Failing here keeps the invariant that every issued token was signed
        // with a real key.
        let session_secret = env::var("SESSION_SECRET")
            .map_err(|_| ConfigError::MissingVar("SESSION_SECRET".to_string()))?;

        if session_secret.len() < MIN_SESSION_SECRET_BYTES {
            return Err(ConfigError::InvalidValue(
                "SESSION_SECRET".to_string(),
                format!("must be at least {} bytes", MIN_SESSION_SECRET_BYTES),
            ));
        }

        // 90-day tokens, renewed when under 14 days remain
        let session_max_age_secs = parse_env_or_default("SESSION_MAX_AGE_SECS", 7_776_000)?;
        let session_renew_threshold_secs =
            parse_env_or_default("SESSION_RENEW_THRESHOLD_SECS", 1_209_600)?;

        if session_max_age_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_MAX_AGE_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        if session_renew_threshold_secs >= session_max_age_secs {
            return Err(ConfigError::InvalidValue(
                "SESSION_RENEW_THRESHOLD_SECS".to_string(),
                "must be below SESSION_MAX_AGE_SECS".to_string(),
            ));
        }

        let cookie_name =
            env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "fratapp_session".to_string());
        if cookie_name.is_empty() || !cookie_name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(ConfigError::InvalidValue(
                "SESSION_COOKIE_NAME".to_string(),
                "must be non-empty alphanumeric (plus hyphen/underscore)".to_string(),
            ));
        }

        let cookie_secure = parse_env_or_default("COOKIE_SECURE", false)?;

        // Server
        let bind_addr_str = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_addr = bind_addr_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::ParseError("BIND_ADDR".to_string(), e.to_string()))?;

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| format!("http://localhost:{}", bind_addr.port()));

        // Password reset
        let reset_token_ttl_secs = parse_env_or_default("RESET_TOKEN_TTL_SECS", 3_600)?;
        let reset_rate_limit_max = parse_env_or_default("RESET_RATE_LIMIT_MAX", 3)?;
        let reset_rate_limit_window_secs =
            parse_env_or_default("RESET_RATE_LIMIT_WINDOW_SECS", 3_600)?;

        // Rate limiting
        let rate_limit_auth_per_min = parse_env_or_default("RATE_LIMIT_AUTH_PER_MIN", 5)?;

        Ok(Config {
            session_secret,
            session_max_age_secs,
            session_renew_threshold_secs,
            cookie_name,
            cookie_secure,
            bind_addr,
            base_url,
            reset_token_ttl_secs,
            reset_rate_limit_max,
            reset_rate_limit_window_secs,
            rate_limit_auth_per_min,
        })
    }
}

/// Helper function to parse environment variable with a default value
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| ConfigError::ParseError(key.to_string(), format!("{}: {}", e, val))),
        Err(_) => Ok(default),
    }
}
