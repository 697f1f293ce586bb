//! Resource kinds served by the API.

mod item;
mod item_set;
mod values;
mod vocabulary;

use anyhow::Result;
use fjall::Keyspace;

use super::adapter::AdapterManager;

pub(crate) use self::item::ItemAdapter;
pub(crate) use self::item_set::ItemSetAdapter;
pub(crate) use self::vocabulary::VocabularyAdapter;

/// Registry with every resource kind, backed by `keyspace`.
pub(crate) fn default_adapters(keyspace: &Keyspace) -> Result<AdapterManager> {
    Ok(AdapterManager::default()
        .with(ItemAdapter::new(keyspace)?)
        .with(ItemSetAdapter::new(keyspace)?)
        .with(VocabularyAdapter))
}
