//! `--config key=value` overrides applied on top of a loaded configuration.

use std::{fmt, str::FromStr};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{AppConfig, Error, Result};

pub trait AssignKeyValue {
    /// Assign a value to a key in a configuration.
    fn assign(&mut self, kv: KvAssignment) -> Result<()>;
}

/// A single `key=value` (or `key:=<json>`) assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvAssignment {
    key: KvKey,
    value: KvValue,
}

/// A dot-delimited configuration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvKey {
    /// What is left of the key after trimming prefixes.
    path: String,

    /// The key as given by the user.
    full_path: String,
}

/// The right-hand side of an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvValue {
    Json(Value),
    String(String),
}

impl fmt::Display for KvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl KvAssignment {
    #[must_use]
    pub fn new(key: impl Into<String>, value: KvValue) -> Self {
        let key = key.into();

        Self {
            key: KvKey {
                path: key.clone(),
                full_path: key,
            },
            value,
        }
    }

    /// The key as given, unaffected by prefix trimming.
    #[must_use]
    pub fn full_key(&self) -> &str {
        &self.key.full_path
    }

    /// The remaining (untrimmed) part of the key.
    #[must_use]
    pub fn key_string(&self) -> String {
        self.key.path.clone()
    }

    /// Trim `segment` from the start of the key, returning whether it matched.
    ///
    /// Given the key `server.base_url`, `p("server")` leaves `base_url`.
    pub fn p(&mut self, segment: &str) -> bool {
        let path = &self.key.path;
        let rest = match path.strip_prefix(segment) {
            Some("") => "",
            Some(rest) => match rest.strip_prefix('.') {
                Some(rest) => rest,
                None => return false,
            },
            None => return false,
        };

        self.key.path = rest.to_owned();
        true
    }

    pub fn try_string(self) -> Result<String> {
        match self.value {
            KvValue::Json(Value::String(v)) | KvValue::String(v) => Ok(v),
            value => Err(self.key.invalid(&value, "a string")),
        }
    }

    pub fn try_some_string(self) -> Result<Option<String>> {
        match &self.value {
            KvValue::Json(Value::Null) => Ok(None),
            KvValue::String(v) if v.is_empty() => Ok(None),
            _ => self.try_string().map(Some),
        }
    }

    pub fn try_bool(self) -> Result<bool> {
        match &self.value {
            KvValue::Json(Value::Bool(v)) => Ok(*v),
            KvValue::String(v) => v.parse().map_err(|_| self.key.invalid(&self.value, "a boolean")),
            value => Err(self.key.invalid(value, "a boolean")),
        }
    }

    pub fn try_u64(self) -> Result<u64> {
        match &self.value {
            KvValue::Json(Value::Number(v)) => v
                .as_u64()
                .ok_or_else(|| self.key.invalid(&self.value, "a positive integer")),
            KvValue::String(v) => v
                .parse()
                .map_err(|_| self.key.invalid(&self.value, "a positive integer")),
            value => Err(self.key.invalid(value, "a positive integer")),
        }
    }

    pub fn try_from_str<T>(self) -> Result<T>
    where
        T: FromStr,
    {
        let raw = match &self.value {
            KvValue::Json(Value::String(v)) | KvValue::String(v) => v,
            value => return Err(self.key.invalid(value, "a string")),
        };

        raw.parse()
            .map_err(|_| self.key.invalid(&self.value, "one of the documented values"))
    }

    /// Deserialize a JSON object (`key:={...}`) into `T`.
    pub fn try_object<T: DeserializeOwned>(self) -> Result<T> {
        match self.value {
            KvValue::Json(v @ Value::Object(_)) => Ok(serde_json::from_value(v)?),
            value => Err(self.key.invalid(&value, "a JSON object")),
        }
    }
}

impl KvKey {
    fn invalid(&self, value: &KvValue, need: &str) -> Error {
        Error::InvalidConfigValue {
            key: self.full_path.clone(),
            value: value.to_string(),
            need: need.to_owned(),
        }
    }
}

impl FromStr for KvAssignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| Error::InvalidAssignment(s.to_owned()))?;

        let key = key.trim();
        if key.is_empty() || key == ":" {
            return Err(Error::InvalidAssignment(s.to_owned()));
        }

        match key.strip_suffix(':') {
            Some(key) => Ok(Self::new(key, KvValue::Json(serde_json::from_str(value)?))),
            None => Ok(Self::new(key, KvValue::String(value.to_owned()))),
        }
    }
}

/// Error for a key that matches no setting.
pub(crate) fn missing_key<T>(kv: &KvAssignment) -> Result<T> {
    let key = kv.full_key();

    // Narrow the suggestions down to the closest known section.
    let mut available_keys = AppConfig::fields();
    let mut prefix = Some(key);
    while let Some(p) = prefix {
        let matches = AppConfig::fields()
            .into_iter()
            .filter(|f| f.starts_with(p))
            .collect::<Vec<_>>();

        if !matches.is_empty() {
            available_keys = matches;
            break;
        }

        prefix = p.rsplit_once('.').map(|(p, _)| p);
    }

    Err(Error::UnknownConfigKey {
        key: key.to_owned(),
        available_keys,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;
    use test_log::test;

    use super::*;

    #[test]
    fn test_parse_string_assignment() {
        let kv: KvAssignment = "server.base_url=http://example.com".parse().unwrap();

        assert_eq!(kv.full_key(), "server.base_url");
        assert_eq!(
            kv.value,
            KvValue::String("http://example.com".to_owned())
        );
    }

    #[test]
    fn test_parse_json_assignment() {
        let kv: KvAssignment = r#"capabilities.icons:={"Calculate":"C"}"#.parse().unwrap();

        assert_eq!(kv.full_key(), "capabilities.icons");
        assert_eq!(kv.value, KvValue::Json(json!({ "Calculate": "C" })));
    }

    #[test]
    fn test_parse_rejects_missing_equals() {
        assert_matches!(
            "server.base_url".parse::<KvAssignment>(),
            Err(Error::InvalidAssignment(_))
        );
        assert_matches!("=foo".parse::<KvAssignment>(), Err(Error::InvalidAssignment(_)));
    }

    #[test]
    fn test_prefix_trimming() {
        let mut kv: KvAssignment = "server.base_url=x".parse().unwrap();

        assert!(!kv.p("serve"));
        assert!(kv.p("server"));
        assert_eq!(kv.key_string(), "base_url");
        assert_eq!(kv.full_key(), "server.base_url");
    }

    #[test]
    fn test_typed_values() {
        let kv: KvAssignment = "style.color=false".parse().unwrap();
        assert!(!kv.try_bool().unwrap());

        let kv: KvAssignment = "chat.status_poll_secs:=5".parse().unwrap();
        assert_eq!(kv.try_u64().unwrap(), 5);

        let kv: KvAssignment = "chat.status_poll_secs=soon".parse().unwrap();
        assert_matches!(kv.try_u64(), Err(Error::InvalidConfigValue { key, .. }) if key == "chat.status_poll_secs");

        let kv: KvAssignment = "auth.username=".parse().unwrap();
        assert_eq!(kv.try_some_string().unwrap(), None);
    }
}
