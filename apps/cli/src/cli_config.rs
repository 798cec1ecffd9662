use std::env;

use usermgmt_core::{AppError, AppResult};
use usermgmt_infrastructure::InitMode;

const DEFAULT_DATABASE_URL: &str = "sqlite://users.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub reset_only: bool,
    pub database_url: String,
    pub init_mode: InitMode,
    pub max_connections: u32,
}

impl CliConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_sources(env::args().nth(1).as_deref(), |name| env::var(name).ok())
    }

    fn from_sources(
        first_arg: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let reset_only = first_arg == Some("reset");

        let database_url = lookup("DATABASE_URL")
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());

        let init_mode = if reset_only {
            InitMode::ResetWithDemo
        } else {
            match lookup("USERMGMT_INIT_MODE") {
                Some(value) => InitMode::parse(value.trim())?,
                None => InitMode::Preserve,
            }
        };

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value.trim().parse::<u32>().map_err(|error| {
                AppError::InvalidInput(format!("invalid DATABASE_MAX_CONNECTIONS: {error}"))
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        if max_connections == 0 {
            return Err(AppError::InvalidInput(
                "DATABASE_MAX_CONNECTIONS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            reset_only,
            database_url,
            init_mode,
            max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(first_arg: Option<&str>, vars: &[(&str, &str)]) -> AppResult<CliConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        CliConfig::from_sources(first_arg, |name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_preserve_local_database() {
        let config = load(None, &[]).unwrap_or_else(|error| panic!("load failed: {error}"));

        assert_eq!(
            config,
            CliConfig {
                reset_only: false,
                database_url: "sqlite://users.db".to_owned(),
                init_mode: InitMode::Preserve,
                max_connections: 1,
            }
        );
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = load(
            None,
            &[
                ("DATABASE_URL", "sqlite::memory:"),
                ("USERMGMT_INIT_MODE", "reset"),
                ("DATABASE_MAX_CONNECTIONS", "4"),
            ],
        )
        .unwrap_or_else(|error| panic!("load failed: {error}"));

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.init_mode, InitMode::Reset);
        assert_eq!(config.max_connections, 4);
    }

    #[test]
    fn reset_argument_forces_demo_reset() {
        let config = load(Some("reset"), &[("USERMGMT_INIT_MODE", "preserve")])
            .unwrap_or_else(|error| panic!("load failed: {error}"));

        assert!(config.reset_only);
        assert_eq!(config.init_mode, InitMode::ResetWithDemo);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for vars in [
            [("USERMGMT_INIT_MODE", "wipe")],
            [("DATABASE_MAX_CONNECTIONS", "many")],
            [("DATABASE_MAX_CONNECTIONS", "0")],
        ] {
            assert!(matches!(load(None, &vars), Err(AppError::InvalidInput(_))));
        }
    }
}
