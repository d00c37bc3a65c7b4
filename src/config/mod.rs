use crate::error::{Result, WireupError};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Environment variable selecting the lifestyle of providers registered without one.
pub const DEFAULT_LIFESTYLE_VAR: &str = "WIREUP_DEFAULT_LIFESTYLE";

/// Environment variable selecting how ambiguity is treated on optional parameters.
pub const OPTIONAL_AMBIGUITY_VAR: &str = "WIREUP_OPTIONAL_AMBIGUITY";

/// Whether a provider builds one shared instance or a fresh one per resolution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Lifestyle {
    #[default]
    Singleton,
    Transient,
}

impl Lifestyle {
    pub fn is_transient(self) -> bool {
        self == Lifestyle::Transient
    }
}

/// What an optional parameter does when its type has several unnamed
/// providers and none is marked default.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum OptionalAmbiguity {
    /// Substitute the absent value, same as for a missing provider.
    #[default]
    Substitute,
    /// Surface the ambiguity error even though the parameter is optional.
    Fail,
}

/// Container-wide settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub default_lifestyle: Lifestyle,
    pub optional_ambiguity: OptionalAmbiguity,
}

impl ContainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env::vars())
    }

    /// Load settings from `(key, value)` pairs; unknown keys are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            match key.as_ref() {
                DEFAULT_LIFESTYLE_VAR => {
                    config.default_lifestyle = parse_var(DEFAULT_LIFESTYLE_VAR, value.as_ref())?
                }
                OPTIONAL_AMBIGUITY_VAR => {
                    config.optional_ambiguity = parse_var(OPTIONAL_AMBIGUITY_VAR, value.as_ref())?
                }
                _ => {}
            }
        }
        Ok(config)
    }

    pub fn with_default_lifestyle(mut self, lifestyle: Lifestyle) -> Self {
        self.default_lifestyle = lifestyle;
        self
    }

    pub fn with_optional_ambiguity(mut self, policy: OptionalAmbiguity) -> Self {
        self.optional_ambiguity = policy;
        self
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr<Err = strum::ParseError>,
{
    value.trim().parse().map_err(|e| WireupError::Config {
        key: key.to_string(),
        message: format!("{} ({:?})", e, value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ContainerConfig::default();
        assert_eq!(config.default_lifestyle, Lifestyle::Singleton);
        assert_eq!(config.optional_ambiguity, OptionalAmbiguity::Substitute);
    }

    #[test]
    fn test_from_vars() {
        let config = ContainerConfig::from_vars([
            ("WIREUP_DEFAULT_LIFESTYLE", "Transient"),
            ("WIREUP_OPTIONAL_AMBIGUITY", "fail"),
            ("PATH", "/usr/bin"),
        ])
        .unwrap();
        assert_eq!(config.default_lifestyle, Lifestyle::Transient);
        assert_eq!(config.optional_ambiguity, OptionalAmbiguity::Fail);
    }

    #[test]
    fn test_from_vars_rejects_unknown_value() {
        let err = ContainerConfig::from_vars([("WIREUP_DEFAULT_LIFESTYLE", "scoped")]).unwrap_err();
        assert!(matches!(err, WireupError::Config { ref key, .. } if key == DEFAULT_LIFESTYLE_VAR));
    }

    #[test]
    fn test_lifestyle_display() {
        assert_eq!(Lifestyle::Transient.to_string(), "transient");
        assert_eq!("SINGLETON".parse::<Lifestyle>().unwrap(), Lifestyle::Singleton);
    }
}
