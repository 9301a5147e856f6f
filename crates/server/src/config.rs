use config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;

const ENV_PREFIX: &str = "NATTER_";

pub const DEFAULT_JWT_SECRET: &str = "change_me_please";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub security: SecuritySettings,
    pub log: LogSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Deserialize, Clone)]
pub struct SecuritySettings {
    /// HS256 key the auth service signs viewer tokens with.
    pub jwt_secret: String,
}

#[derive(Deserialize, Clone)]
pub struct LogSettings {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        Self::build(&run_mode, collect_env_vars(std::env::vars()))
    }

    fn build(run_mode: &str, env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let env_json =
            serde_json::to_string(&env_map).map_err(|e| ConfigError::Message(e.to_string()))?;

        let s = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.cors_origins", "*")?
            .set_default("database.url", "sqlite://data/natter.db")?
            .set_default("security.jwt_secret", DEFAULT_JWT_SECRET)?
            .set_default("log.filter", "info")?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(config::File::from_str(&env_json, config::FileFormat::Json))
            .build()?;

        s.try_deserialize()
    }
}

/// `NATTER_SERVER__PORT=8080` becomes `server.port = "8080"`.
fn collect_env_vars(vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
    vars.filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches(ENV_PREFIX)
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Iterator<Item = (String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_env_keys_are_nested_and_filtered() {
        let map = collect_env_vars(vars(&[
            ("NATTER_SERVER__PORT", "8080"),
            ("NATTER_SECURITY__JWT_SECRET", "k"),
            ("PATH", "/usr/bin"),
        ]));
        assert_eq!(map.get("server.port").map(String::as_str), Some("8080"));
        assert_eq!(map.get("security.jwt_secret").map(String::as_str), Some("k"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_defaults_and_overrides() {
        let settings = Settings::build("test-no-such-file", HashMap::new()).unwrap();
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.server.cors_origins, "*");
        assert_eq!(settings.database.url, "sqlite://data/natter.db");
        assert_eq!(settings.security.jwt_secret, DEFAULT_JWT_SECRET);
        assert_eq!(settings.log.filter, "info");

        let env = collect_env_vars(vars(&[
            ("NATTER_SERVER__PORT", "8081"),
            ("NATTER_DATABASE__URL", "sqlite::memory:"),
        ]));
        let settings = Settings::build("test-no-such-file", env).unwrap();
        assert_eq!(settings.server.port, 8081);
        assert_eq!(settings.database.url, "sqlite::memory:");
    }
}
