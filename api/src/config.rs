use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 4001;
pub const DEFAULT_MAX_CONNECTIONS: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Env {
    Dev,
    Staging,
    Production,
}

impl Env {
    fn parse(value: Option<&str>) -> Option<Self> {
        match value {
            Some("dev") | None => Some(Env::Dev),
            Some("staging") => Some(Env::Staging),
            Some("production") => Some(Env::Production),
            Some(_) => None,
        }
    }

    /// Read `ENVIRONMENT` without logging, unknown values mean dev. Usable
    /// before the tracing subscriber exists.
    pub fn from_env() -> Self {
        Env::parse(var("ENVIRONMENT").ok().flatten().as_deref()).unwrap_or(Env::Dev)
    }

    fn from_env_logged() -> Self {
        let value = var("ENVIRONMENT").ok().flatten();
        Env::parse(value.as_deref()).unwrap_or_else(|| {
            tracing::warn!(
                "Unknown environment `{}`, falling back to dev",
                value.unwrap_or_default()
            );
            Env::Dev
        })
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub env: Env,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            env: Env::Dev,
            port: DEFAULT_PORT,
            database: None,
        }
    }
}

fn var(key: &str) -> Result<Option<String>, String> {
    match std::env::var(key) {
        Ok(env) => Ok(Some(env)),
        Err(e) => match e {
            std::env::VarError::NotPresent => Ok(None),
            std::env::VarError::NotUnicode(_) => Err(format!(
                "Could not get the environment variable `{key}` due to unicode error"
            )),
        },
    }
}

/// Parse an optional variable, logging and falling back to `default` when it
/// is missing or malformed.
fn parsed_var<T: FromStr>(key: &str, default: T) -> T {
    parse_or(key, var(key), default)
}

fn parse_or<T: FromStr>(key: &str, value: Result<Option<String>, String>, default: T) -> T {
    match value {
        Ok(Some(val)) => match val.trim().parse() {
            Ok(val) => val,
            Err(_) => {
                tracing::warn!("Invalid value `{val}` for environment variable `{key}`, using default");
                default
            }
        },
        Ok(None) => default,
        Err(e) => {
            tracing::warn!("{e}, using default");
            default
        }
    }
}

impl ServerConfig {
    pub fn new_from_env() -> Self {
        let database = match var("DATABASE_URL") {
            Ok(Some(url)) if !url.trim().is_empty() => Some(DatabaseConfig {
                url,
                max_connections: parsed_var("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            }),
            Ok(_) => {
                tracing::warn!("Missing environment variable `DATABASE_URL`, keeping data in memory");
                None
            }
            Err(e) => {
                tracing::error!("{e}");
                std::process::exit(1)
            }
        };

        ServerConfig {
            env: Env::from_env_logged(),
            port: parsed_var("PORT", DEFAULT_PORT),
            database,
        }
    }
}
