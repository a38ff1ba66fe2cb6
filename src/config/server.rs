/// Server binding configuration.
///
/// `HOST` and `PORT` environment variables override the defaults.
use std::env;

use super::game::ConfigError;

/// Default interface to bind.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port to listen on.
pub const DEFAULT_PORT: u16 = 3000;

/// Path of the location catalog file, if overridden.
pub const CATALOG_ENV: &str = "GEODUEL_CATALOG";

pub fn bind_address() -> Result<(String, u16), ConfigError> {
    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = match env::var("PORT") {
        Ok(raw) => raw
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::Invalid { key: "PORT", value: raw })?,
        Err(_) => DEFAULT_PORT,
    };
    Ok((host, port))
}
