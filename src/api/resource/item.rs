use anyhow::{Context, Result};
use fjall::Keyspace;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::info;

use crate::api::adapter::{Adapter, ApiServices, SearchQuery};
use crate::api::representation::{JsonLdFields, ResourceRepresentation};
use crate::api::resource_id::ResourceId;
use crate::json_ld::TermDefinition;
use crate::repo::RecordRepo;

use super::item_set::ITEM_SETS;
use super::values::{
    PropertyValues, date_time, display_title, insert_values, invalid, parse_bool, parse_values,
    vocabulary_terms,
};

pub(crate) const ITEMS: &str = "items";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct ItemRecord {
    pub(crate) is_public: bool,
    pub(crate) created: Timestamp,
    #[serde(default)]
    pub(crate) item_sets: Vec<u64>,
    #[serde(default)]
    pub(crate) values: PropertyValues,
}

impl ItemRecord {
    /// Parse an Omeka style JSON-LD body. Item set references must exist.
    pub(crate) fn from_request(
        request: &Value,
        created: Timestamp,
        item_sets: &RecordRepo,
    ) -> Result<ItemRecord> {
        let Some(request) = request.as_object() else {
            return Err(invalid("item should be a JSON object"));
        };
        let mut set_ids = Vec::new();
        match request.get("o:item_set") {
            None | Some(Value::Null) => {}
            Some(Value::Array(references)) => {
                for reference in references {
                    let Some(id) = reference.get("o:id").and_then(Value::as_u64) else {
                        return Err(invalid("o:item_set entries need an integer o:id"));
                    };
                    if !item_sets.contains(id)? {
                        return Err(invalid(format!("item set {id} does not exist")));
                    }
                    if !set_ids.contains(&id) {
                        set_ids.push(id);
                    }
                }
            }
            Some(_) => return Err(invalid("o:item_set should be an array")),
        }
        Ok(ItemRecord {
            is_public: parse_bool(request, "o:is_public", true)?,
            created,
            item_sets: set_ids,
            values: parse_values(request)?,
        })
    }
}

impl JsonLdFields for ItemRecord {
    fn json_ld(representation: &ResourceRepresentation<'_, Self>) -> Result<Map<String, Value>> {
        let item = representation.data();
        let services = representation.services();
        let item_set_adapter = representation.adapter_for(ITEM_SETS)?;
        let item_sets = item
            .item_sets
            .iter()
            .map(|id| services.reference(item_set_adapter, &ResourceId::Int(*id)))
            .collect::<Result<Vec<_>>>()?;
        let Value::Object(mut fields) = json!({
            "@type": "o:Item",
            "o:is_public": item.is_public,
            "o:created": date_time(&item.created),
            "o:item_set": item_sets,
        }) else {
            unreachable!()
        };
        if let Some(title) = display_title(&item.values) {
            fields.insert("o:title".to_owned(), Value::String(title.to_owned()));
        }
        insert_values(&item.values, &mut fields);
        Ok(fields)
    }
    fn context_terms(&self) -> Vec<(String, TermDefinition)> {
        vocabulary_terms(&self.values)
    }
}

pub(crate) struct ItemAdapter {
    items: RecordRepo,
    item_sets: RecordRepo,
}

impl ItemAdapter {
    pub(crate) fn new(keyspace: &Keyspace) -> Result<ItemAdapter> {
        Ok(ItemAdapter {
            items: RecordRepo::new(keyspace, ITEMS)?,
            item_sets: RecordRepo::new(keyspace, ITEM_SETS)?,
        })
    }
    fn represent(&self, id: u64, item: ItemRecord, services: &ApiServices<'_>) -> Result<Value> {
        ResourceRepresentation::new(ResourceId::Int(id), item, self, *services)?.to_json_ld()
    }
}

impl Adapter for ItemAdapter {
    fn resource_name(&self) -> &'static str {
        ITEMS
    }
    fn read(&self, id: &ResourceId, services: &ApiServices<'_>) -> Result<Option<Value>> {
        let Some(id) = id.as_int() else {
            return Ok(None);
        };
        match self.items.find_one(id)? {
            Some(item) => Ok(Some(self.represent(id, item, services)?)),
            None => Ok(None),
        }
    }
    fn search(&self, query: &SearchQuery, services: &ApiServices<'_>) -> Result<Vec<Value>> {
        let (offset, limit) = query.window();
        self.items
            .scan::<ItemRecord>()
            .filter(|entry| match (entry, query.item_set_id) {
                (Ok((_, item)), Some(set_id)) => item.item_sets.contains(&set_id),
                _ => true,
            })
            .skip(offset)
            .take(limit)
            .map(|entry| {
                let (id, item) = entry?;
                self.represent(id, item, services)
            })
            .collect()
    }
    fn create(&self, request: &Value, services: &ApiServices<'_>) -> Result<Value> {
        let item = ItemRecord::from_request(request, Timestamp::now(), &self.item_sets)?;
        let id = self.items.insert(&item).context("unable to store item")?;
        info!(target: "api", id, item_sets = ?item.item_sets, "created item");
        self.represent(id, item, services)
    }
}
