use std::collections::BTreeMap;

use anyhow::Result;
use serde::Deserialize;
use serde_json::{Value, json};

use super::error::ApiError;
use super::resource_id::ResourceId;
use super::router::{API_ROUTE, RouteParams, UrlBuilder, UrlOptions};

pub(crate) const DEFAULT_PER_PAGE: usize = 25;
pub(crate) const MAX_PER_PAGE: usize = 100;

/// Query string of a search request. Unknown parameters are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SearchQuery {
    pub(crate) page: Option<usize>,
    pub(crate) per_page: Option<usize>,
    pub(crate) item_set_id: Option<u64>,
}

impl SearchQuery {
    /// Number of records to skip and to take.
    pub(crate) fn window(&self) -> (usize, usize) {
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        let page = self.page.unwrap_or(1).max(1);
        ((page - 1).saturating_mul(per_page), per_page)
    }
}

/// Translates between stored records and their API representations.
pub(crate) trait Adapter: Send + Sync {
    fn resource_name(&self) -> &'static str;

    fn read(&self, id: &ResourceId, services: &ApiServices<'_>) -> Result<Option<Value>>;

    fn search(&self, query: &SearchQuery, services: &ApiServices<'_>) -> Result<Vec<Value>>;

    fn create(&self, _request: &Value, _services: &ApiServices<'_>) -> Result<Value> {
        Err(ApiError::NotImplemented {
            resource: self.resource_name(),
            operation: "create",
        }
        .into())
    }
}

/// Registry of adapters keyed by resource name.
#[derive(Default)]
pub(crate) struct AdapterManager {
    adapters: BTreeMap<&'static str, Box<dyn Adapter>>,
}

impl AdapterManager {
    pub(crate) fn with(mut self, adapter: impl Adapter + 'static) -> AdapterManager {
        self.adapters.insert(adapter.resource_name(), Box::new(adapter));
        self
    }
    pub(crate) fn get(&self, resource_name: &str) -> Option<&dyn Adapter> {
        self.adapters.get(resource_name).map(|adapter| &**adapter)
    }
    pub(crate) fn require(&self, resource_name: &str) -> Result<&dyn Adapter> {
        self.get(resource_name).ok_or_else(|| {
            ApiError::Lookup(format!("no adapter registered for {resource_name}")).into()
        })
    }
    pub(crate) fn resource_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.adapters.keys().copied()
    }
}

/// Collaborators handed to adapters and representations for one request.
#[derive(Clone, Copy)]
pub(crate) struct ApiServices<'a> {
    pub(crate) urls: &'a dyn UrlBuilder,
    pub(crate) adapters: &'a AdapterManager,
}

impl<'a> ApiServices<'a> {
    pub(crate) fn new(urls: &'a dyn UrlBuilder, adapters: &'a AdapterManager) -> Self {
        ApiServices { urls, adapters }
    }

    /// Canonical URL of a resource.
    pub(crate) fn api_url(&self, resource_name: &str, id: &ResourceId) -> Result<String> {
        let mut params = RouteParams::new();
        params.insert("resource", resource_name.to_owned());
        params.insert("id", id.to_string());
        self.urls.build(API_ROUTE, &params, &UrlOptions::canonical())
    }

    /// Canonical URL of a resource listing narrowed by `options.query`.
    pub(crate) fn search_url(&self, resource_name: &str, options: UrlOptions) -> Result<String> {
        let mut params = RouteParams::new();
        params.insert("resource", resource_name.to_owned());
        let options = UrlOptions {
            force_canonical: true,
            ..options
        };
        self.urls.build(API_ROUTE, &params, &options)
    }

    /// Linked reference to another resource: `{"@id": url, "o:id": id}`.
    pub(crate) fn reference(&self, adapter: &dyn Adapter, id: &ResourceId) -> Result<Value> {
        Ok(json!({
            "@id": self.api_url(adapter.resource_name(), id)?,
            "o:id": id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use serde_json::{Value, json};

    use crate::api::error::ApiError;
    use crate::api::resource_id::ResourceId;
    use crate::api::router::ApiRouter;

    use super::{Adapter, AdapterManager, ApiServices, SearchQuery};

    struct Widgets;

    impl Adapter for Widgets {
        fn resource_name(&self) -> &'static str {
            "widgets"
        }
        fn read(&self, _id: &ResourceId, _services: &ApiServices<'_>) -> Result<Option<Value>> {
            Ok(None)
        }
        fn search(&self, _query: &SearchQuery, _services: &ApiServices<'_>) -> Result<Vec<Value>> {
            Ok(vec![])
        }
    }

    #[test]
    fn lookup_by_name() -> Result<()> {
        let adapters = AdapterManager::default().with(Widgets);
        assert!(adapters.get("widgets").is_some());
        assert!(adapters.get("gadgets").is_none());
        let error = adapters.require("gadgets").err().expect("lookup should fail");
        assert!(matches!(
            error.downcast_ref::<ApiError>(),
            Some(ApiError::Lookup(_))
        ));
        assert_eq!(adapters.resource_names().collect::<Vec<_>>(), ["widgets"]);
        Ok(())
    }

    #[test]
    fn reference_to_resource() -> Result<()> {
        let router = ApiRouter::new("https://example.org")?;
        let adapters = AdapterManager::default().with(Widgets);
        let services = ApiServices::new(&router, &adapters);
        assert_eq!(
            services.reference(adapters.require("widgets")?, &ResourceId::Int(3))?,
            json!({ "@id": "https://example.org/api/widgets/3", "o:id": 3 })
        );
        assert_eq!(
            services.reference(&Widgets, &ResourceId::from("w-1"))?,
            json!({ "@id": "https://example.org/api/widgets/w-1", "o:id": "w-1" })
        );
        Ok(())
    }

    #[test]
    fn create_is_not_implemented_by_default() -> Result<()> {
        let router = ApiRouter::new("https://example.org")?;
        let adapters = AdapterManager::default().with(Widgets);
        let services = ApiServices::new(&router, &adapters);
        let error = Widgets
            .create(&json!({}), &services)
            .err()
            .expect("create should fail");
        assert!(matches!(
            error.downcast_ref::<ApiError>(),
            Some(ApiError::NotImplemented { .. })
        ));
        Ok(())
    }

    #[test]
    fn search_window() {
        assert_eq!(SearchQuery::default().window(), (0, 25));
        let query = SearchQuery {
            page: Some(3),
            per_page: Some(10),
            ..Default::default()
        };
        assert_eq!(query.window(), (20, 10));
        let query = SearchQuery {
            page: Some(0),
            per_page: Some(1000),
            ..Default::default()
        };
        assert_eq!(query.window(), (0, 100));
    }
}
