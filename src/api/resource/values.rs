//! Property values shared by items and item sets.

use std::collections::BTreeMap;

use anyhow::Result;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::api::error::ApiError;
use crate::json_ld::TermDefinition;
use crate::json_ld::vocab::{ID, LANGUAGE, TYPE, VALUE, XSD_DATE_TIME};

use super::vocabulary::find_vocabulary;

const TITLE_TERM: &str = "dcterms:title";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ValueRecord {
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    Uri {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

/// Values keyed by prefixed property term, e.g. `dcterms:title`.
pub(crate) type PropertyValues = BTreeMap<String, Vec<ValueRecord>>;

impl ValueRecord {
    fn from_request(term: &str, value: &Value) -> Result<ValueRecord> {
        if let Some(literal) = value.get(VALUE) {
            let Some(literal) = literal.as_str() else {
                return Err(invalid(format!("{term} @value should be a string")));
            };
            let language = match value.get(LANGUAGE) {
                Some(Value::String(language)) if !language.is_empty() => Some(language.clone()),
                Some(Value::String(_)) | Some(Value::Null) | None => None,
                Some(_) => return Err(invalid(format!("{term} @language should be a string"))),
            };
            return Ok(ValueRecord::Literal {
                value: literal.to_owned(),
                language,
            });
        }
        if let Some(iri) = value.get(ID) {
            let Some(iri) = iri.as_str() else {
                return Err(invalid(format!("{term} @id should be a string")));
            };
            let label = value
                .get("o:label")
                .and_then(Value::as_str)
                .map(str::to_owned);
            return Ok(ValueRecord::Uri {
                id: iri.to_owned(),
                label,
            });
        }
        Err(invalid(format!("{term} value needs either @value or @id")))
    }

    fn to_json_ld(&self) -> Value {
        match self {
            ValueRecord::Literal { value, language } => {
                let mut node = json!({ "type": "literal", "@value": value });
                if let Some(language) = language {
                    node[LANGUAGE] = Value::String(language.clone());
                }
                node
            }
            ValueRecord::Uri { id, label } => {
                let mut node = json!({ "type": "uri", "@id": id });
                if let Some(label) = label {
                    node["o:label"] = Value::String(label.clone());
                }
                node
            }
        }
    }
}

/// Collect property values from a create request. Keywords and terms of the
/// application vocabulary are left to the caller.
pub(crate) fn parse_values(request: &Map<String, Value>) -> Result<PropertyValues> {
    let mut values = PropertyValues::new();
    for (term, value) in request {
        if term.starts_with('@') || term.starts_with("o:") {
            continue;
        }
        let Some((prefix, local_name)) = term.split_once(':') else {
            return Err(invalid(format!("{term} is not a property term")));
        };
        if local_name.is_empty() {
            return Err(invalid(format!("{term} is not a property term")));
        }
        if find_vocabulary(prefix).is_none() {
            return Err(invalid(format!("unknown vocabulary prefix {prefix}")));
        }
        let Some(array) = value.as_array() else {
            return Err(invalid(format!("{term} should be an array of values")));
        };
        let parsed = array
            .iter()
            .map(|v| ValueRecord::from_request(term, v))
            .collect::<Result<Vec<_>>>()?;
        if !parsed.is_empty() {
            values.insert(term.clone(), parsed);
        }
    }
    Ok(values)
}

pub(crate) fn parse_bool(request: &Map<String, Value>, key: &str, default: bool) -> Result<bool> {
    match request.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(invalid(format!("{key} should be a boolean"))),
    }
}

/// First literal title, used as the display title.
pub(crate) fn display_title(values: &PropertyValues) -> Option<&str> {
    values.get(TITLE_TERM)?.iter().find_map(|value| match value {
        ValueRecord::Literal { value, .. } => Some(value.as_str()),
        ValueRecord::Uri { .. } => None,
    })
}

pub(crate) fn insert_values(values: &PropertyValues, fields: &mut Map<String, Value>) {
    for (term, list) in values {
        let nodes = list.iter().map(ValueRecord::to_json_ld).collect();
        fields.insert(term.clone(), Value::Array(nodes));
    }
}

/// One context term per vocabulary prefix used by the values.
pub(crate) fn vocabulary_terms(values: &PropertyValues) -> Vec<(String, TermDefinition)> {
    let mut terms: Vec<(String, TermDefinition)> = Vec::new();
    for term in values.keys() {
        let Some((prefix, _)) = term.split_once(':') else {
            continue;
        };
        if terms.iter().any(|(known, _)| known == prefix) {
            continue;
        }
        if let Some(vocabulary) = find_vocabulary(prefix) {
            terms.push((prefix.to_owned(), vocabulary.namespace_uri.into()));
        }
    }
    terms
}

pub(crate) fn date_time(timestamp: &Timestamp) -> Value {
    let mut node = Map::new();
    node.insert(VALUE.to_owned(), Value::String(timestamp.to_string()));
    node.insert(TYPE.to_owned(), Value::String(XSD_DATE_TIME.to_owned()));
    Value::Object(node)
}

pub(super) fn invalid(message: impl Into<String>) -> anyhow::Error {
    ApiError::Validation(message.into()).into()
}
