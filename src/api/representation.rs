//! JSON-LD representation of a registered API resource.
//!
//! A representation wraps one record and produces the JSON-LD object served by
//! the API. The envelope (`@context`, `@id` and `o:id`) is shared by every
//! resource kind; the remaining fields come from [`JsonLdFields`]. Fields are
//! merged on top of the envelope, so a field named like an envelope key
//! replaces it.

use anyhow::Result;
use serde::ser::{Error as _, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::json_ld::vocab::{CONTEXT, ID};
use crate::json_ld::{JsonLdContext, TermDefinition};

use super::adapter::{Adapter, ApiServices};
use super::resource_id::ResourceId;

pub(crate) const O_ID: &str = "o:id";

/// Resource-specific part of a representation.
pub(crate) trait JsonLdFields {
    /// Fields of the JSON-LD object, without the envelope.
    fn json_ld(representation: &ResourceRepresentation<'_, Self>) -> Result<Map<String, Value>>
    where
        Self: Sized;

    /// Terms added to the `@context` when the representation is built.
    fn context_terms(&self) -> Vec<(String, TermDefinition)> {
        Vec::new()
    }
}

pub(crate) struct ResourceRepresentation<'a, T> {
    id: ResourceId,
    data: T,
    adapter: &'a dyn Adapter,
    services: ApiServices<'a>,
    context: JsonLdContext,
}

impl<'a, T: JsonLdFields> ResourceRepresentation<'a, T> {
    pub(crate) fn new(
        id: ResourceId,
        data: T,
        adapter: &'a dyn Adapter,
        services: ApiServices<'a>,
    ) -> Result<Self> {
        let terms = data.context_terms();
        let mut representation = ResourceRepresentation {
            id,
            data,
            adapter,
            services,
            context: JsonLdContext::default(),
        };
        for (term, definition) in terms {
            representation.add_context_term(&term, definition)?;
        }
        Ok(representation)
    }

    pub(crate) fn id(&self) -> &ResourceId {
        &self.id
    }

    pub(crate) fn data(&self) -> &T {
        &self.data
    }

    pub(crate) fn adapter(&self) -> &'a dyn Adapter {
        self.adapter
    }

    /// Another adapter by resource name.
    pub(crate) fn adapter_for(&self, resource_name: &str) -> Result<&'a dyn Adapter> {
        self.services.adapters.require(resource_name)
    }

    pub(crate) fn services(&self) -> &ApiServices<'a> {
        &self.services
    }

    pub(crate) fn context(&self) -> &JsonLdContext {
        &self.context
    }

    pub(super) fn add_context_term(
        &mut self,
        term: &str,
        definition: TermDefinition,
    ) -> Result<()> {
        self.context.insert(term, definition)
    }

    pub(crate) fn api_url(&self) -> Result<String> {
        self.services.api_url(self.adapter().resource_name(), &self.id)
    }

    /// Compose the complete JSON-LD object.
    pub(crate) fn to_json_ld(&self) -> Result<Value> {
        let fields = T::json_ld(self)?;
        let mut json_ld = Map::new();
        json_ld.insert(CONTEXT.to_owned(), serde_json::to_value(self.context())?);
        json_ld.insert(ID.to_owned(), Value::String(self.api_url()?));
        json_ld.insert(O_ID.to_owned(), serde_json::to_value(&self.id)?);
        for (key, value) in fields {
            if json_ld.contains_key(&key) {
                debug!(
                    target: "api",
                    resource = self.adapter.resource_name(),
                    id = %self.id,
                    key = %key,
                    "field overrides the envelope"
                );
            }
            json_ld.insert(key, value);
        }
        Ok(Value::Object(json_ld))
    }
}

impl<T: JsonLdFields> Serialize for ResourceRepresentation<'_, T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json_ld()
            .map_err(|e| S::Error::custom(format!("{e:#}")))?
            .serialize(serializer)
    }
}
