//! Type identity - Global, stable identity for every declared type
//!
//! Format: dot-separated fully-qualified name, optionally carrying a
//! type-parameter suffix.
//!
//! Examples:
//! - `com.example.auth.TokenValidator`
//! - `com.example.Repository<T>` (parameterized)
//!
//! Identities are the primary key for contribution records, replace/exclude
//! sets, marker file names, and accessor derivation. Two identities are equal
//! exactly when their qualified strings are equal.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fully-qualified identity of a declared type.
///
/// The qualified string is the canonical form; ordering and hashing are
/// defined over it so collections of identities sort deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeIdentity {
    /// Canonical qualified form, including any type-parameter suffix
    qualified: String,
    /// Byte offset of the `<` starting the parameter suffix, if present
    params_at: Option<usize>,
}

impl TypeIdentity {
    /// Parse a qualified name into a TypeIdentity.
    ///
    /// Accepts `seg(.seg)*` with an optional trailing `<...>` suffix.
    /// Segments must be non-empty and free of whitespace.
    pub fn parse(raw: &str) -> Result<Self> {
        let qualified = raw.trim();
        if qualified.is_empty() {
            return Err(Error::InvalidIdentity("empty type name".to_string()));
        }

        let params_at = match qualified.find('<') {
            Some(idx) => {
                if !qualified.ends_with('>') || idx == 0 {
                    return Err(Error::InvalidIdentity(format!(
                        "malformed type parameters in: {}",
                        qualified
                    )));
                }
                Some(idx)
            }
            None => {
                if qualified.contains('>') {
                    return Err(Error::InvalidIdentity(format!(
                        "malformed type parameters in: {}",
                        qualified
                    )));
                }
                None
            }
        };

        let base = &qualified[..params_at.unwrap_or(qualified.len())];
        for segment in base.split('.') {
            if segment.is_empty() {
                return Err(Error::InvalidIdentity(format!(
                    "empty segment in: {}",
                    qualified
                )));
            }
            if segment.chars().any(|c| c.is_whitespace() || c == '/') {
                return Err(Error::InvalidIdentity(format!(
                    "invalid character in segment '{}' of: {}",
                    segment, qualified
                )));
            }
        }

        Ok(Self {
            qualified: qualified.to_string(),
            params_at,
        })
    }

    /// The canonical qualified name, including any type-parameter suffix
    pub fn qualified_name(&self) -> &str {
        &self.qualified
    }

    /// The qualified name with any type-parameter suffix stripped
    pub fn base_name(&self) -> &str {
        &self.qualified[..self.params_at.unwrap_or(self.qualified.len())]
    }

    /// Whether this identity carries type parameters (`Foo<T>`)
    pub fn is_parameterized(&self) -> bool {
        self.params_at.is_some()
    }

    /// Dot-separated segments of the base name, outermost first
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.base_name().split('.')
    }

    /// The last segment of the base name
    pub fn simple_name(&self) -> &str {
        self.base_name().rsplit('.').next().unwrap_or(self.base_name())
    }

    /// The namespace segments (all but the last), possibly empty
    pub fn namespace_segments(&self) -> Vec<&str> {
        let mut segments: Vec<&str> = self.segments().collect();
        segments.pop();
        segments
    }

    /// Namespace-safe mangled form: base name with dots replaced by `_`.
    ///
    /// Used in marker file names, where the identity must survive as a plain
    /// file-system token while staying greppable.
    pub fn flattened(&self) -> String {
        self.base_name().replace('.', "_")
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified)
    }
}

impl FromStr for TypeIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for TypeIdentity {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.qualified)
    }
}

impl<'de> Deserialize<'de> for TypeIdentity {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TypeIdentity::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let id = TypeIdentity::parse("com.example.auth.TokenValidator").unwrap();
        assert_eq!(id.qualified_name(), "com.example.auth.TokenValidator");
        assert_eq!(id.simple_name(), "TokenValidator");
        assert_eq!(id.namespace_segments(), vec!["com", "example", "auth"]);
        assert!(!id.is_parameterized());
    }

    #[test]
    fn test_parse_parameterized() {
        let id = TypeIdentity::parse("com.example.Repository<T>").unwrap();
        assert!(id.is_parameterized());
        assert_eq!(id.base_name(), "com.example.Repository");
        assert_eq!(id.simple_name(), "Repository");
    }

    #[test]
    fn test_parse_single_segment() {
        let id = TypeIdentity::parse("AppScope").unwrap();
        assert_eq!(id.simple_name(), "AppScope");
        assert!(id.namespace_segments().is_empty());
    }

    #[test]
    fn test_flattened() {
        let id = TypeIdentity::parse("com.example.Impl").unwrap();
        assert_eq!(id.flattened(), "com_example_Impl");
    }

    #[test]
    fn test_invalid_identities() {
        assert!(TypeIdentity::parse("").is_err());
        assert!(TypeIdentity::parse("com..Impl").is_err());
        assert!(TypeIdentity::parse(".leading").is_err());
        assert!(TypeIdentity::parse("trailing.").is_err());
        assert!(TypeIdentity::parse("has space.Impl").is_err());
        assert!(TypeIdentity::parse("<T>").is_err());
        assert!(TypeIdentity::parse("com.example.Broken<T").is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let id = TypeIdentity::parse("com.example.Iface").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"com.example.Iface\"");
        let back: TypeIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_ordering_is_stable() {
        let mut ids = vec![
            TypeIdentity::parse("b.Second").unwrap(),
            TypeIdentity::parse("a.First").unwrap(),
            TypeIdentity::parse("a.First<T>").unwrap(),
        ];
        ids.sort();
        assert_eq!(ids[0].qualified_name(), "a.First");
        assert_eq!(ids[1].qualified_name(), "a.First<T>");
        assert_eq!(ids[2].qualified_name(), "b.Second");
    }
}
