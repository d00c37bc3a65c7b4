use crate::di::TypeKey;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WireupError>;

#[derive(Debug, Error)]
pub enum WireupError {
    #[error("Invalid provider for {type_name}: {message}")]
    InvalidProvider { type_name: String, message: String },

    #[error("Provider not found: {key}")]
    ProviderNotFound { key: String },

    #[error(
        "Ambiguous provider for {type_name}: {candidates} unnamed providers registered and none marked default"
    )]
    AmbiguousProvider { type_name: String, candidates: usize },

    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    #[error("Invocation of {target} failed: {source}")]
    Invocation {
        target: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Cannot assign resolved value to {type_name}")]
    SlotAssignment { type_name: String },

    #[error("Invalid configuration value for {key}: {message}")]
    Config { key: String, message: String },
}

impl WireupError {
    pub(crate) fn invalid_provider(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidProvider {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    pub(crate) fn not_found(key: TypeKey, name: Option<&str>) -> Self {
        Self::ProviderNotFound {
            key: key.describe(name),
        }
    }

    pub(crate) fn invocation(target: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Invocation {
            target: target.into(),
            source,
        }
    }

    pub(crate) fn slot_assignment(key: TypeKey) -> Self {
        Self::SlotAssignment {
            type_name: key.name().to_string(),
        }
    }

    /// Whether the lookup failed because no provider matched.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ProviderNotFound { .. })
    }

    /// Whether the lookup failed because several unnamed providers matched.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::AmbiguousProvider { .. })
    }
}
