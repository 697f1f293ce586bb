use std::collections::BTreeMap;

use anyhow::{Result, bail};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use super::vocab::{self, OMEKA_VOCABULARY_IRI, OMEKA_VOCABULARY_TERM, TermDefinition};

/// Local `@context` of an API resource.
///
/// The application vocabulary term is always present. Terms can be added but
/// never removed, and the vocabulary term cannot be redefined.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct JsonLdContext {
    term_map: BTreeMap<String, TermDefinition>,
}

impl Default for JsonLdContext {
    fn default() -> Self {
        let mut term_map = BTreeMap::new();
        term_map.insert(OMEKA_VOCABULARY_TERM.to_owned(), OMEKA_VOCABULARY_IRI);
        JsonLdContext { term_map }
    }
}

impl JsonLdContext {
    pub(crate) fn insert(&mut self, term: &str, definition: TermDefinition) -> Result<()> {
        if term.is_empty() {
            bail!("invalid term definition (empty string)");
        }
        if term.starts_with('@') {
            bail!("keyword redefinition error ({term})");
        }
        if term == OMEKA_VOCABULARY_TERM {
            if definition == OMEKA_VOCABULARY_IRI {
                return Ok(());
            }
            bail!("the {OMEKA_VOCABULARY_TERM} term cannot be redefined");
        }
        if let TermDefinition::Expanded(map) = &definition {
            validate_expanded(map)?;
        }
        if self.has_term(term) {
            debug!(target: "api", term, "redefining context term");
        }
        self.term_map.insert(term.to_owned(), definition);
        Ok(())
    }
    pub(crate) fn has_term(&self, term: &str) -> bool {
        self.get_term(term).is_some()
    }
    pub(crate) fn get_term(&self, term: &str) -> Option<&TermDefinition> {
        self.term_map.get(term)
    }
}

impl Serialize for JsonLdContext {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.term_map.len()))?;
        for (term, definition) in &self.term_map {
            map.serialize_entry(term, &definition.to_value())?;
        }
        map.end()
    }
}

fn validate_expanded(map: &Map<String, JsonValue>) -> Result<()> {
    match map.get(vocab::ID) {
        Some(JsonValue::String(_)) | None => {}
        Some(_) => bail!("invalid IRI mapping error (entry is not a string)"),
    }
    for entry in map.keys() {
        if ![
            "@id",
            "@reverse",
            "@container",
            "@context",
            "@direction",
            "@index",
            "@language",
            "@nest",
            "@prefix",
            "@protected",
            "@type",
        ]
        .contains(&entry.as_str())
        {
            bail!("invalid term definition (unknown keyword {entry})");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use serde_json::json;

    use crate::json_ld::vocab::{OMEKA_VOCABULARY_IRI, TermDefinition};

    use super::JsonLdContext;

    #[test]
    fn default_has_vocabulary_term() -> Result<()> {
        let context = JsonLdContext::default();
        assert_eq!(context.get_term("o"), Some(&OMEKA_VOCABULARY_IRI));
        assert_eq!(
            serde_json::to_value(&context)?,
            json!({ "o": "http://omeka.org/vocabulary#" })
        );
        Ok(())
    }

    #[test]
    fn add_iri_term() -> Result<()> {
        let mut context = JsonLdContext::default();
        context.insert("dcterms", "http://purl.org/dc/terms/".into())?;
        assert!(context.has_term("o"));
        assert!(context.has_term("dcterms"));
        assert_eq!(
            serde_json::to_value(&context)?,
            json!({
                "dcterms": "http://purl.org/dc/terms/",
                "o": "http://omeka.org/vocabulary#"
            })
        );
        Ok(())
    }

    #[test]
    fn add_expanded_term() -> Result<()> {
        let mut context = JsonLdContext::default();
        let serde_json::Value::Object(map) = json!({ "@id": "o:item_set", "@type": "@id" }) else {
            unreachable!()
        };
        context.insert("itemSet", TermDefinition::from(map))?;
        assert_eq!(
            serde_json::to_value(&context)?["itemSet"],
            json!({ "@id": "o:item_set", "@type": "@id" })
        );
        Ok(())
    }

    #[test]
    fn expanded_term_with_unknown_keyword() {
        let mut context = JsonLdContext::default();
        let serde_json::Value::Object(map) = json!({ "@id": "o:x", "@foo": true }) else {
            unreachable!()
        };
        assert!(context.insert("x", map.into()).is_err());
    }

    #[test]
    fn expanded_term_with_invalid_id() {
        let mut context = JsonLdContext::default();
        let serde_json::Value::Object(map) = json!({ "@id": [] }) else {
            unreachable!()
        };
        assert!(context.insert("x", map.into()).is_err());
    }

    #[test]
    fn empty_term() {
        let mut context = JsonLdContext::default();
        assert!(context.insert("", "http://example.com/".into()).is_err());
    }

    #[test]
    fn keyword_override() {
        let mut context = JsonLdContext::default();
        assert!(context.insert("@type", "http://example.com/".into()).is_err());
    }

    #[test]
    fn vocabulary_term_is_fixed() -> Result<()> {
        let mut context = JsonLdContext::default();
        assert!(context.insert("o", "http://example.com/".into()).is_err());
        context.insert("o", OMEKA_VOCABULARY_IRI)?;
        assert_eq!(context.get_term("o"), Some(&OMEKA_VOCABULARY_IRI));
        Ok(())
    }

    #[test]
    fn redefine_added_term() -> Result<()> {
        let mut context = JsonLdContext::default();
        context.insert("foaf", "http://example.com/".into())?;
        context.insert("foaf", "http://xmlns.com/foaf/0.1/".into())?;
        assert_eq!(
            context.get_term("foaf"),
            Some(&TermDefinition::new_iri("http://xmlns.com/foaf/0.1/"))
        );
        assert_eq!(
            serde_json::to_value(&context)?,
            json!({
                "foaf": "http://xmlns.com/foaf/0.1/",
                "o": "http://omeka.org/vocabulary#"
            })
        );
        Ok(())
    }
}
