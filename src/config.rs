// src/config.rs
use std::{env, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} tidak ditemukan di .env")]
    Missing(&'static str),

    #[error("{key} tidak valid: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub cors_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            host: lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: parse_or(&lookup, "APP_PORT", 8000)?,
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./uploads")),
            cors_origin: lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".into()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let env = lookup(&[("DATABASE_URL", "mysql://localhost/sekolah")]);
        let cfg = Config::from_lookup(env).unwrap();
        assert_eq!(cfg.max_connections, 5);
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(cfg.cors_origin, "http://localhost:3000");
    }

    #[test]
    fn overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "mysql://db/sekolah"),
            ("APP_PORT", "9090"),
            ("DB_MAX_CONNECTIONS", "20"),
            ("UPLOAD_DIR", "/srv/uploads"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.max_connections, 20);
        assert_eq!(cfg.upload_dir, PathBuf::from("/srv/uploads"));
    }

    #[test]
    fn missing_database_url() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn invalid_port() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "mysql://db/sekolah"),
            ("APP_PORT", "delapan ribu"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "APP_PORT", .. }));
    }
}
