//! Route table and URL building for API resources.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use url::Url;

use super::error::ApiError;

/// Route of the JSON-LD API: `/api[/{resource}[/{id}]]`.
pub(crate) const API_ROUTE: &str = "api/default";

pub(crate) type RouteParams = BTreeMap<&'static str, String>;

#[derive(Debug, Clone, Default)]
pub(crate) struct UrlOptions {
    /// Produce an absolute URL rooted at the configured base URL.
    pub(crate) force_canonical: bool,
    pub(crate) query: BTreeMap<String, String>,
}

impl UrlOptions {
    pub(crate) fn canonical() -> UrlOptions {
        UrlOptions {
            force_canonical: true,
            ..Default::default()
        }
    }
    pub(crate) fn with_query(mut self, key: &str, value: impl ToString) -> UrlOptions {
        self.query.insert(key.to_owned(), value.to_string());
        self
    }
}

/// Builds URLs from named routes.
pub(crate) trait UrlBuilder: Send + Sync {
    fn build(&self, route: &str, params: &RouteParams, options: &UrlOptions) -> Result<String>;
}

/// The API route table, rooted at a base URL.
#[derive(Debug, Clone)]
pub(crate) struct ApiRouter {
    base_url: Url,
}

impl ApiRouter {
    pub(crate) fn new(base_url: &str) -> Result<ApiRouter> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid base url {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("base url {base_url} cannot be a base");
        }
        Ok(ApiRouter { base_url })
    }

    fn api_default(&self, params: &RouteParams, options: &UrlOptions) -> Result<String> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::Lookup(format!("{} cannot be a base", self.base_url)))?;
            segments.pop_if_empty().push("api");
            match (params.get("resource"), params.get("id")) {
                (Some(resource), Some(id)) => {
                    segments.push(resource).push(id);
                }
                (Some(resource), None) => {
                    segments.push(resource);
                }
                (None, Some(_)) => {
                    return Err(ApiError::Lookup(format!(
                        "route {API_ROUTE} needs a resource when an id is given"
                    ))
                    .into());
                }
                (None, None) => {}
            }
        }
        if !options.query.is_empty() {
            url.query_pairs_mut().extend_pairs(options.query.iter());
        }
        if options.force_canonical {
            return Ok(url.into());
        }
        let mut relative = url.path().to_owned();
        if let Some(query) = url.query() {
            relative.push('?');
            relative.push_str(query);
        }
        Ok(relative)
    }
}

impl UrlBuilder for ApiRouter {
    fn build(&self, route: &str, params: &RouteParams, options: &UrlOptions) -> Result<String> {
        match route {
            API_ROUTE => self.api_default(params, options),
            _ => Err(ApiError::Lookup(format!("route {route} is not defined")).into()),
        }
    }
}
