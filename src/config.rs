use std::{env, fmt::Display, str::FromStr};

use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn is_development(self) -> bool {
        self == AppEnv::Development
    }
}

impl FromStr for AppEnv {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnv::Development),
            "production" | "prod" => Ok(AppEnv::Production),
            other => Err(format!("unknown environment `{other}`")),
        }
    }
}

impl Display for AppEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppEnv::Development => write!(f, "development"),
            AppEnv::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub app_env: AppEnv,
    /// 未配置时使用内存存储
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub workers: usize,
    pub id_worker_id: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            app_env: AppEnv::Development,
            database_url: None,
            db_max_connections: 10,
            workers: 4,
            id_worker_id: 1,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: try_load(&lookup, "PORT", defaults.port),
            app_env: try_load(&lookup, "APP_ENV", defaults.app_env),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            db_max_connections: try_load(&lookup, "DB_MAX_CONNECTIONS", defaults.db_max_connections),
            workers: try_load(&lookup, "WORKERS", defaults.workers),
            id_worker_id: try_load(&lookup, "ID_WORKER_ID", defaults.id_worker_id),
        }
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value `{raw}`: {e}, using default: {default}");
            default
        }),
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.port, 5000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert!(config.database_url.is_none());
        assert_eq!(config.workers, 4);
    }

    #[test]
    fn reads_values() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("APP_ENV", "Production"),
            ("DATABASE_URL", "postgres://localhost/wishes"),
            ("DB_MAX_CONNECTIONS", "3"),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.app_env, AppEnv::Production);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/wishes"));
        assert_eq!(config.db_max_connections, 3);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[("PORT", "eighty"), ("APP_ENV", "staging"), ("DATABASE_URL", " ")]);
        assert_eq!(config.port, 5000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert!(config.database_url.is_none());
    }
}
