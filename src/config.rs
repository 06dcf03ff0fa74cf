use std::env;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(anyhow::anyhow!("Unknown store backend: {s}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    /// Only required for the Postgres backend.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub app_base_url: String,
    /// Usernames registered at startup when running on the in-memory store.
    pub seed_teachers: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let store_backend: StoreBackend = env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".into())
            .parse()?;

        let database_url = match store_backend {
            StoreBackend::Postgres => Some(required("DATABASE_URL")?),
            StoreBackend::Memory => env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
        };

        Ok(Self {
            store_backend,
            database_url,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".into())
                .parse()?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost".into()),
            seed_teachers: env::var("SEED_TEACHERS")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
        })
    }
}

impl Default for Config {
    /// Local defaults, backed by the in-memory store.
    fn default() -> Self {
        Self {
            store_backend: StoreBackend::Memory,
            database_url: None,
            database_max_connections: 10,
            host: "127.0.0.1".into(),
            port: 8080,
            app_base_url: "http://localhost".into(),
            seed_teachers: Vec::new(),
        }
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_from_str() {
        assert_eq!("postgres".parse::<StoreBackend>().unwrap(), StoreBackend::Postgres);
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("mongo".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list(" mchen, ,mrodriguez "), vec!["mchen", "mrodriguez"]);
        assert!(parse_list("").is_empty());
    }
}
