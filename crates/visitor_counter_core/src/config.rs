use crate::contract::{ResponseEncoding, COUNTER_KEY, DEFAULT_TABLE_NAME};

pub const TABLE_NAME_VAR: &str = "COUNTER_TABLE_NAME";
pub const COUNTER_KEY_VAR: &str = "COUNTER_KEY";
pub const CONSISTENT_READ_VAR: &str = "COUNTER_CONSISTENT_READ";
pub const REQUIRE_EXISTING_VAR: &str = "COUNTER_REQUIRE_EXISTING";
pub const RESPONSE_ENCODING_VAR: &str = "COUNTER_RESPONSE_ENCODING";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterConfig {
    pub table_name: String,
    pub counter_key: String,
    pub consistent_read: bool,
    pub require_existing_record: bool,
    pub encoding: ResponseEncoding,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            counter_key: COUNTER_KEY.to_string(),
            consistent_read: false,
            require_existing_record: false,
            encoding: ResponseEncoding::Raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConfigError {}

impl CounterConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through `lookup`, falling back to the deployed
    /// defaults for every unset variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let table_name = non_empty(TABLE_NAME_VAR, lookup(TABLE_NAME_VAR))?
            .unwrap_or(defaults.table_name);
        let counter_key = non_empty(COUNTER_KEY_VAR, lookup(COUNTER_KEY_VAR))?
            .unwrap_or(defaults.counter_key);

        let consistent_read = match lookup(CONSISTENT_READ_VAR) {
            Some(value) => parse_flag(CONSISTENT_READ_VAR, &value)?,
            None => defaults.consistent_read,
        };
        let require_existing_record = match lookup(REQUIRE_EXISTING_VAR) {
            Some(value) => parse_flag(REQUIRE_EXISTING_VAR, &value)?,
            None => defaults.require_existing_record,
        };
        let encoding = match lookup(RESPONSE_ENCODING_VAR) {
            Some(value) => ResponseEncoding::parse(&value).ok_or_else(|| {
                ConfigError::new(format!(
                    "{RESPONSE_ENCODING_VAR} must be 'raw' or 'json', got '{value}'"
                ))
            })?,
            None => defaults.encoding,
        };

        Ok(Self {
            table_name,
            counter_key,
            consistent_read,
            require_existing_record,
            encoding,
        })
    }
}

fn non_empty(name: &str, value: Option<String>) -> Result<Option<String>, ConfigError> {
    match value {
        Some(text) if text.trim().is_empty() => {
            Err(ConfigError::new(format!("{name} cannot be empty")))
        }
        Some(text) => Ok(Some(text.trim().to_string())),
        None => Ok(None),
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => Err(ConfigError::new(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}
