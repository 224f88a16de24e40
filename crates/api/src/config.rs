use stride_core::civil::CivilClock;
use stride_core::error::CoreError;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// IANA name of the product's reference timezone for civil-day math.
    pub delivery_timezone: String,
    /// Local hour at which the civil day rolls over (default: `3`).
    pub day_boundary_hour: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `3000`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `DELIVERY_TIMEZONE`    | `America/New_York`      |
    /// | `DAY_BOUNDARY_HOUR`    | `3`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let delivery_timezone =
            std::env::var("DELIVERY_TIMEZONE").unwrap_or_else(|_| "America/New_York".into());

        let day_boundary_hour: u32 = std::env::var("DAY_BOUNDARY_HOUR")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("DAY_BOUNDARY_HOUR must be a valid hour");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            delivery_timezone,
            day_boundary_hour,
        }
    }

    /// Build the civil clock for this deployment. An invalid timezone or
    /// boundary hour is a startup-fatal configuration error.
    pub fn civil_clock(&self) -> Result<CivilClock, CoreError> {
        CivilClock::new(&self.delivery_timezone, self.day_boundary_hour)
    }
}
