#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterError {
    /// The record store could not be reached or rejected the call.
    DependencyUnavailable { message: String },
    /// No counter record exists under the configured key.
    MissingRecord { table: String, key: String },
    /// A record exists but its count attribute cannot be read as a count.
    MalformedRecord { message: String },
}

impl CounterError {
    pub fn dependency_unavailable(message: impl Into<String>) -> Self {
        Self::DependencyUnavailable {
            message: message.into(),
        }
    }

    pub fn missing_record(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingRecord {
            table: table.into(),
            key: key.into(),
        }
    }

    pub fn malformed_record(message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::DependencyUnavailable { .. } => "dependency_unavailable",
            Self::MissingRecord { .. } => "missing_record",
            Self::MalformedRecord { .. } => "malformed_record",
        }
    }
}

impl std::fmt::Display for CounterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DependencyUnavailable { message } => {
                write!(f, "record store unavailable: {message}")
            }
            Self::MissingRecord { table, key } => {
                write!(f, "counter record '{key}' not found in table '{table}'")
            }
            Self::MalformedRecord { message } => write!(f, "malformed counter record: {message}"),
        }
    }
}

impl std::error::Error for CounterError {}
