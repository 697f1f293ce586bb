//! JSON-LD API layer: adapters, representations and URL building.

mod adapter;
mod error;
mod representation;
pub(crate) mod resource;
mod resource_id;
mod router;

pub(crate) use self::adapter::{Adapter, AdapterManager, ApiServices, SearchQuery};
pub(crate) use self::error::ApiError;
pub(crate) use self::resource::default_adapters;
pub(crate) use self::resource_id::ResourceId;
pub(crate) use self::router::ApiRouter;
