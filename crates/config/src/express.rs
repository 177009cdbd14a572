use crate::ConfigError;
use std::net::IpAddr;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct ExpressConfig {
    /// Address to bind the HTTP server to
    ///
    /// Env: SIGHT_EXPRESS_HOST
    /// Default: 0.0.0.0
    pub host: String,

    /// Port to bind the HTTP server to
    ///
    /// Env: SIGHT_EXPRESS_PORT
    /// Default: 8000
    pub port: u16,
}

pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    8000
}

impl ExpressConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::ValidateError(
                "Express port cannot be 0".to_string(),
            ));
        }

        if IpAddr::from_str(&self.host).is_err() {
            return Err(ConfigError::ValidateError(format!(
                "Express host '{}' is not a valid IP address",
                self.host
            )));
        }

        Ok(())
    }

    /// Parsed bind address. Only valid after `validate` succeeded.
    pub fn ip(&self) -> Option<IpAddr> {
        IpAddr::from_str(&self.host).ok()
    }
}

impl Default for ExpressConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
