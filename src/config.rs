use crate::model::ConfigError;
use std::env;

pub const URL_VAR: &str = "SUPABASE_URL";
pub const KEY_VAR: &str = "SUPABASE_KEY";
pub const TABLE_VAR: &str = "SUPABASE_TABLE";
pub const SQLITE_VAR: &str = "SHOPFEED_SQLITE_PATH";

const DEFAULT_TABLE: &str = "products";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Rest { url: String, api_key: String },
    Sqlite { path: String },
}

/// Where the load stage writes rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfig {
    pub destination: Destination,
    pub table: String,
}

/// Reads the load-stage settings from the process environment.
pub fn load_config() -> Result<LoadConfig, ConfigError> {
    load_config_from(|var| env::var(var).ok())
}

/// Same as [`load_config`], with the variable lookup supplied by the caller.
/// Empty values count as unset.
pub fn load_config_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<LoadConfig, ConfigError> {
    let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let table = get(TABLE_VAR).unwrap_or_else(|| DEFAULT_TABLE.to_string());

    let destination = match get(SQLITE_VAR) {
        Some(path) => Destination::Sqlite { path },
        None => {
            let url = get(URL_VAR).ok_or(ConfigError::Missing(URL_VAR))?;
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::Invalid {
                    var: URL_VAR,
                    reason: format!("expected an http(s) URL, got {:?}", url),
                });
            }
            let api_key = get(KEY_VAR).ok_or(ConfigError::Missing(KEY_VAR))?;
            Destination::Rest { url, api_key }
        }
    };

    Ok(LoadConfig { destination, table })
}
