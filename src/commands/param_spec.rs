//! `key=value` parsing for `--segment` and `--query` arguments.

use anyhow::{Result, anyhow};
use std::str::FromStr;

/// A single parameter given on the command line.
/// Format: "key=value" (the value may be empty and may itself contain `=`)
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParamSpec {
    pub key: String,
    pub value: String,
}

impl std::fmt::Display for ParamSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl FromStr for ParamSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid parameter {:?}. Expected 'key=value'.", s))?;
        if key.is_empty() {
            return Err(anyhow!(
                "Invalid parameter {:?}: key cannot be empty. Expected 'key=value'.",
                s
            ));
        }
        Ok(ParamSpec {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param_spec() {
        let spec = ParamSpec::from_str("id=550").unwrap();
        assert_eq!(spec.key, "id");
        assert_eq!(spec.value, "550");
    }

    #[test]
    fn test_parse_param_spec_value_with_equals() {
        let spec = ParamSpec::from_str("query=a=b").unwrap();
        assert_eq!(spec.key, "query");
        assert_eq!(spec.value, "a=b");
    }

    #[test]
    fn test_parse_param_spec_empty_value() {
        let spec = ParamSpec::from_str("region=").unwrap();
        assert_eq!(spec.value, "");
    }

    #[test]
    fn test_parse_param_spec_invalid() {
        assert!(ParamSpec::from_str("novalue").is_err());
        let err = ParamSpec::from_str("=550").unwrap_err();
        assert!(err.to_string().contains("key cannot be empty"));
    }

    #[test]
    fn test_param_spec_display() {
        let spec = ParamSpec::from_str("language=en-US").unwrap();
        assert_eq!(spec.to_string(), "language=en-US");
    }
}
