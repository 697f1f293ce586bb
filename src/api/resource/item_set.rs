use anyhow::{Context, Result};
use fjall::Keyspace;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::info;

use crate::api::adapter::{Adapter, ApiServices, SearchQuery};
use crate::api::representation::{JsonLdFields, ResourceRepresentation};
use crate::api::resource_id::ResourceId;
use crate::api::router::UrlOptions;
use crate::json_ld::TermDefinition;
use crate::repo::RecordRepo;

use super::item::ITEMS;
use super::values::{
    PropertyValues, date_time, display_title, insert_values, invalid, parse_bool, parse_values,
    vocabulary_terms,
};

pub(crate) const ITEM_SETS: &str = "item_sets";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct ItemSetRecord {
    pub(crate) is_public: bool,
    pub(crate) is_open: bool,
    pub(crate) created: Timestamp,
    #[serde(default)]
    pub(crate) values: PropertyValues,
}

impl ItemSetRecord {
    pub(crate) fn from_request(request: &Value, created: Timestamp) -> Result<ItemSetRecord> {
        let Some(request) = request.as_object() else {
            return Err(invalid("item set should be a JSON object"));
        };
        Ok(ItemSetRecord {
            is_public: parse_bool(request, "o:is_public", true)?,
            is_open: parse_bool(request, "o:is_open", false)?,
            created,
            values: parse_values(request)?,
        })
    }
}

impl JsonLdFields for ItemSetRecord {
    fn json_ld(representation: &ResourceRepresentation<'_, Self>) -> Result<Map<String, Value>> {
        let item_set = representation.data();
        let items = representation.services().search_url(
            ITEMS,
            UrlOptions::default().with_query("item_set_id", representation.id()),
        )?;
        let Value::Object(mut fields) = json!({
            "@type": "o:ItemSet",
            "o:is_public": item_set.is_public,
            "o:is_open": item_set.is_open,
            "o:created": date_time(&item_set.created),
            "o:items": { "@id": items },
        }) else {
            unreachable!()
        };
        if let Some(title) = display_title(&item_set.values) {
            fields.insert("o:title".to_owned(), Value::String(title.to_owned()));
        }
        insert_values(&item_set.values, &mut fields);
        Ok(fields)
    }
    fn context_terms(&self) -> Vec<(String, TermDefinition)> {
        vocabulary_terms(&self.values)
    }
}

pub(crate) struct ItemSetAdapter {
    item_sets: RecordRepo,
}

impl ItemSetAdapter {
    pub(crate) fn new(keyspace: &Keyspace) -> Result<ItemSetAdapter> {
        Ok(ItemSetAdapter {
            item_sets: RecordRepo::new(keyspace, ITEM_SETS)?,
        })
    }
    fn represent(
        &self,
        id: u64,
        item_set: ItemSetRecord,
        services: &ApiServices<'_>,
    ) -> Result<Value> {
        ResourceRepresentation::new(ResourceId::Int(id), item_set, self, *services)?.to_json_ld()
    }
}

impl Adapter for ItemSetAdapter {
    fn resource_name(&self) -> &'static str {
        ITEM_SETS
    }
    fn read(&self, id: &ResourceId, services: &ApiServices<'_>) -> Result<Option<Value>> {
        let Some(id) = id.as_int() else {
            return Ok(None);
        };
        match self.item_sets.find_one(id)? {
            Some(item_set) => Ok(Some(self.represent(id, item_set, services)?)),
            None => Ok(None),
        }
    }
    fn search(&self, query: &SearchQuery, services: &ApiServices<'_>) -> Result<Vec<Value>> {
        let (offset, limit) = query.window();
        self.item_sets
            .scan::<ItemSetRecord>()
            .skip(offset)
            .take(limit)
            .map(|entry| {
                let (id, item_set) = entry?;
                self.represent(id, item_set, services)
            })
            .collect()
    }
    fn create(&self, request: &Value, services: &ApiServices<'_>) -> Result<Value> {
        let item_set = ItemSetRecord::from_request(request, Timestamp::now())?;
        let id = self
            .item_sets
            .insert(&item_set)
            .context("unable to store item set")?;
        info!(target: "api", id, "created item set");
        self.represent(id, item_set, services)
    }
}
