use anyhow::Result;
use serde_json::{Map, Value, json};

use crate::api::adapter::{Adapter, ApiServices, SearchQuery};
use crate::api::representation::{JsonLdFields, ResourceRepresentation};
use crate::api::resource_id::ResourceId;
use crate::json_ld::TermDefinition;

pub(crate) const VOCABULARIES: &str = "vocabularies";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VocabularyRecord {
    pub(crate) prefix: &'static str,
    pub(crate) namespace_uri: &'static str,
    pub(crate) label: &'static str,
    pub(crate) comment: &'static str,
}

/// Vocabularies available to property values.
pub(crate) const BUILTIN_VOCABULARIES: [VocabularyRecord; 4] = [
    VocabularyRecord {
        prefix: "dcterms",
        namespace_uri: "http://purl.org/dc/terms/",
        label: "Dublin Core",
        comment: "Basic resource metadata (DCMI Metadata Terms)",
    },
    VocabularyRecord {
        prefix: "dctype",
        namespace_uri: "http://purl.org/dc/dcmitype/",
        label: "Dublin Core Type",
        comment: "Basic resource types (DCMI Type Vocabulary)",
    },
    VocabularyRecord {
        prefix: "bibo",
        namespace_uri: "http://purl.org/ontology/bibo/",
        label: "Bibliographic Ontology",
        comment: "Bibliographic metadata (BIBO)",
    },
    VocabularyRecord {
        prefix: "foaf",
        namespace_uri: "http://xmlns.com/foaf/0.1/",
        label: "Friend of a Friend",
        comment: "Relationships between people and organizations (FOAF)",
    },
];

pub(crate) fn find_vocabulary(prefix: &str) -> Option<&'static VocabularyRecord> {
    BUILTIN_VOCABULARIES
        .iter()
        .find(|vocabulary| vocabulary.prefix == prefix)
}

impl JsonLdFields for VocabularyRecord {
    fn json_ld(representation: &ResourceRepresentation<'_, Self>) -> Result<Map<String, Value>> {
        let vocabulary = representation.data();
        let Value::Object(fields) = json!({
            "@type": "o:Vocabulary",
            "o:namespace_uri": vocabulary.namespace_uri,
            "o:prefix": vocabulary.prefix,
            "o:label": vocabulary.label,
            "o:comment": vocabulary.comment,
        }) else {
            unreachable!()
        };
        Ok(fields)
    }
    fn context_terms(&self) -> Vec<(String, TermDefinition)> {
        vec![(
            self.prefix.to_owned(),
            TermDefinition::const_iri(self.namespace_uri),
        )]
    }
}

/// Read-only adapter over the built-in vocabularies, keyed by prefix.
pub(crate) struct VocabularyAdapter;

impl VocabularyAdapter {
    fn represent(&self, vocabulary: VocabularyRecord, services: &ApiServices<'_>) -> Result<Value> {
        let id = ResourceId::from(vocabulary.prefix);
        ResourceRepresentation::new(id, vocabulary, self, *services)?.to_json_ld()
    }
}

impl Adapter for VocabularyAdapter {
    fn resource_name(&self) -> &'static str {
        VOCABULARIES
    }
    fn read(&self, id: &ResourceId, services: &ApiServices<'_>) -> Result<Option<Value>> {
        let Some(vocabulary) = id.as_str().and_then(find_vocabulary) else {
            return Ok(None);
        };
        Ok(Some(self.represent(*vocabulary, services)?))
    }
    fn search(&self, query: &SearchQuery, services: &ApiServices<'_>) -> Result<Vec<Value>> {
        let (offset, limit) = query.window();
        BUILTIN_VOCABULARIES
            .iter()
            .skip(offset)
            .take(limit)
            .map(|vocabulary| self.represent(*vocabulary, services))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use serde_json::json;

    use crate::api::adapter::{Adapter, AdapterManager, ApiServices, SearchQuery};
    use crate::api::resource_id::ResourceId;
    use crate::api::router::ApiRouter;

    use super::{VocabularyAdapter, find_vocabulary};

    #[test]
    fn read_vocabulary() -> Result<()> {
        let router = ApiRouter::new("https://example.org")?;
        let adapters = AdapterManager::default().with(VocabularyAdapter);
        let services = ApiServices::new(&router, &adapters);
        let vocabulary = VocabularyAdapter.read(&ResourceId::from("foaf"), &services)?;
        assert_eq!(
            vocabulary,
            Some(json!({
                "@context": {
                    "o": "http://omeka.org/vocabulary#",
                    "foaf": "http://xmlns.com/foaf/0.1/"
                },
                "@id": "https://example.org/api/vocabularies/foaf",
                "@type": "o:Vocabulary",
                "o:id": "foaf",
                "o:namespace_uri": "http://xmlns.com/foaf/0.1/",
                "o:prefix": "foaf",
                "o:label": "Friend of a Friend",
                "o:comment": "Relationships between people and organizations (FOAF)"
            }))
        );
        Ok(())
    }

    #[test]
    fn read_unknown_vocabulary() -> Result<()> {
        let router = ApiRouter::new("https://example.org")?;
        let adapters = AdapterManager::default().with(VocabularyAdapter);
        let services = ApiServices::new(&router, &adapters);
        assert_eq!(VocabularyAdapter.read(&ResourceId::from("schema"), &services)?, None);
        assert_eq!(VocabularyAdapter.read(&ResourceId::Int(1), &services)?, None);
        Ok(())
    }

    #[test]
    fn search_pages() -> Result<()> {
        let router = ApiRouter::new("https://example.org")?;
        let adapters = AdapterManager::default().with(VocabularyAdapter);
        let services = ApiServices::new(&router, &adapters);
        let all = VocabularyAdapter.search(&SearchQuery::default(), &services)?;
        assert_eq!(all.len(), 4);
        let query = SearchQuery {
            page: Some(2),
            per_page: Some(3),
            ..Default::default()
        };
        let page = VocabularyAdapter.search(&query, &services)?;
        assert_eq!(page.len(), 1);
        assert_eq!(page[0]["o:prefix"], json!("foaf"));
        Ok(())
    }

    #[test]
    fn lookup_prefix() {
        assert_eq!(
            find_vocabulary("dcterms").map(|v| v.namespace_uri),
            Some("http://purl.org/dc/terms/")
        );
        assert!(find_vocabulary("o").is_none());
    }
}
