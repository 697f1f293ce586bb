use std::borrow::Cow;

use serde_json::{Map, Value};

/// Right-hand side of a context entry: either a plain IRI or an expanded term
/// definition such as `{"@id": "o:item_set", "@type": "@id"}`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TermDefinition {
    Iri(Cow<'static, str>),
    Expanded(Map<String, Value>),
}

impl TermDefinition {
    pub(crate) fn new_iri(iri: &str) -> TermDefinition {
        TermDefinition::Iri(Cow::Owned(iri.to_owned()))
    }

    pub(crate) const fn const_iri(iri: &'static str) -> TermDefinition {
        TermDefinition::Iri(Cow::Borrowed(iri))
    }

    pub(crate) fn to_value(&self) -> Value {
        match self {
            TermDefinition::Iri(iri) => Value::String(iri.to_string()),
            TermDefinition::Expanded(map) => Value::Object(map.clone()),
        }
    }
}

impl From<&str> for TermDefinition {
    fn from(iri: &str) -> Self {
        TermDefinition::new_iri(iri)
    }
}

impl From<Map<String, Value>> for TermDefinition {
    fn from(map: Map<String, Value>) -> Self {
        TermDefinition::Expanded(map)
    }
}

pub(crate) const CONTEXT: &str = "@context";
pub(crate) const ID: &str = "@id";
pub(crate) const TYPE: &str = "@type";
pub(crate) const VALUE: &str = "@value";
pub(crate) const LANGUAGE: &str = "@language";

/// The JSON-LD term that expands to the application vocabulary.
pub(crate) const OMEKA_VOCABULARY_TERM: &str = "o";
pub(crate) const OMEKA_VOCABULARY_IRI: TermDefinition =
    TermDefinition::const_iri("http://omeka.org/vocabulary#");

pub(crate) const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
