//! Server settings loaded via OrthoConfig.
//!
//! Values come from `GREENLIGHT_*` environment variables, configuration files,
//! and command-line flags, in OrthoConfig's usual precedence order.

use std::net::{Ipv4Addr, SocketAddr};

use greenlight::domain::permitted_value;
use greenlight::inbound::http::json::DEFAULT_MAX_BODY_BYTES;
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_ENVIRONMENT: &str = "development";
const ENVIRONMENTS: [&str; 3] = ["development", "staging", "production"];

/// Settings that cannot be served.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("environment must be one of development, staging or production (got {0:?})")]
    UnknownEnvironment(String),
    #[error("max body bytes must be greater than zero")]
    ZeroBodyLimit,
}

/// Values controlling how the API server listens and what it accepts.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GREENLIGHT")]
pub struct ServerSettings {
    /// TCP port to listen on.
    #[ortho_config(default = 6118)]
    pub port: u16,
    /// Deployment environment name.
    pub env: Option<String>,
    /// Largest request body accepted, in bytes.
    pub max_body_bytes: Option<usize>,
}

impl ServerSettings {
    /// Configured environment, falling back to `development`.
    pub fn environment(&self) -> &str {
        self.env.as_deref().unwrap_or(DEFAULT_ENVIRONMENT)
    }

    /// Configured body cap, falling back to 1 MiB.
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES)
    }

    /// Address the server binds to on every interface.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// Reject settings the server cannot run with.
    ///
    /// # Errors
    /// Returns [`SettingsError`] naming the first unusable value.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let environment = self.environment();
        if !permitted_value(&environment, &ENVIRONMENTS) {
            return Err(SettingsError::UnknownEnvironment(environment.to_owned()));
        }
        if self.max_body_bytes() == 0 {
            return Err(SettingsError::ZeroBodyLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("greenlight")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("GREENLIGHT_PORT", None::<String>),
            ("GREENLIGHT_ENV", None::<String>),
            ("GREENLIGHT_MAX_BODY_BYTES", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.port, 6118);
        assert_eq!(settings.environment(), "development");
        assert_eq!(settings.max_body_bytes(), 1_048_576);
        assert_eq!(settings.bind_addr().to_string(), "0.0.0.0:6118");
        assert_eq!(settings.validate(), Ok(()));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("GREENLIGHT_PORT", Some("4000".to_owned())),
            ("GREENLIGHT_ENV", Some("staging".to_owned())),
            ("GREENLIGHT_MAX_BODY_BYTES", Some("2048".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.port, 4000);
        assert_eq!(settings.environment(), "staging");
        assert_eq!(settings.max_body_bytes(), 2048);
        assert_eq!(settings.validate(), Ok(()));
    }

    #[rstest]
    #[case(Some("qa"), None, SettingsError::UnknownEnvironment("qa".to_owned()))]
    #[case(None, Some(0), SettingsError::ZeroBodyLimit)]
    fn unusable_settings_are_rejected(
        #[case] env: Option<&str>,
        #[case] max_body_bytes: Option<usize>,
        #[case] expected: SettingsError,
    ) {
        let settings = ServerSettings {
            port: 6118,
            env: env.map(str::to_owned),
            max_body_bytes,
        };
        assert_eq!(settings.validate(), Err(expected));
    }
}
