//! Server settings.

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default interface to listen on.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// A setting that couldn't be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT {0:?}: expected a number between 0 and 65535")]
    InvalidPort(String),
}

/// How the server listens and how loud it logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `host:port` to bind the WebSocket listener to.
    pub bind_addr: String,

    /// Verbose logging: unknown message kinds, undecodable frames,
    /// rejected fleets. Used as the log level when `RUST_LOG` is unset.
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("{DEFAULT_HOST}:{DEFAULT_PORT}"),
            debug: false,
        }
    }
}

impl ServerConfig {
    /// Reads `HOST`, `PORT` and `DEBUG` from the environment.
    ///
    /// Unset variables fall back to the defaults. `DEBUG` is on only when
    /// it is exactly `"true"`.
    ///
    /// # Errors
    /// [`ConfigError::InvalidPort`] if `PORT` is set but isn't a port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), but reads variables through
    /// `lookup`.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };
        let debug = lookup("DEBUG").as_deref() == Some("true");

        Ok(Self {
            bind_addr: format!("{host}:{port}"),
            debug,
        })
    }
}
