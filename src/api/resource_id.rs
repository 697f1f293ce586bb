use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Unique identifier of an API resource. Stored records use integers, built-in
/// resources such as vocabularies are keyed by strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub(crate) enum ResourceId {
    Int(u64),
    Str(String),
}

impl ResourceId {
    /// Interpret a path segment, preferring the integer form.
    pub(crate) fn parse(raw: &str) -> ResourceId {
        match raw.parse::<u64>() {
            Ok(id) if !raw.starts_with('+') => ResourceId::Int(id),
            _ => ResourceId::Str(raw.to_owned()),
        }
    }
    pub(crate) fn as_int(&self) -> Option<u64> {
        match self {
            ResourceId::Int(id) => Some(*id),
            ResourceId::Str(_) => None,
        }
    }
    pub(crate) fn as_str(&self) -> Option<&str> {
        match self {
            ResourceId::Int(_) => None,
            ResourceId::Str(id) => Some(id),
        }
    }
}

impl From<u64> for ResourceId {
    fn from(id: u64) -> Self {
        ResourceId::Int(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId::Str(id.to_owned())
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceId::Int(id) => id.fmt(f),
            ResourceId::Str(id) => id.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use serde_json::json;

    use super::ResourceId;

    #[test]
    fn parse_path_segment() {
        assert_eq!(ResourceId::parse("42"), ResourceId::Int(42));
        assert_eq!(ResourceId::parse("dcterms"), ResourceId::from("dcterms"));
        assert_eq!(ResourceId::parse("+42"), ResourceId::from("+42"));
        assert_eq!(ResourceId::parse("-1"), ResourceId::from("-1"));
    }

    #[test]
    fn serialize_untagged() -> Result<()> {
        assert_eq!(serde_json::to_value(ResourceId::Int(42))?, json!(42));
        assert_eq!(serde_json::to_value(ResourceId::from("foaf"))?, json!("foaf"));
        let id: ResourceId = serde_json::from_value(json!(7))?;
        assert_eq!(id.as_int(), Some(7));
        Ok(())
    }
}
