//! Route table lookup.
//!
//! # Responsibilities
//! - Store one backend target per path template
//! - Look up the target for a matched template
//! - Expose the backend origin used as the proxy cache key
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) lookup via HashMap keyed by the template string
//! - Explicit `None` rather than silent default

use std::collections::{BTreeMap, HashMap};

use url::Url;

use crate::config::validation::parse_target;
use crate::error::ConfigError;
use crate::proxy::director::Director;

/// A resolved backend target for one route template.
#[derive(Debug, Clone)]
pub struct RouteTarget {
    template: String,
    url: Url,
    origin: String,
    director: Director,
}

impl RouteTarget {
    pub fn new(template: impl Into<String>, raw_url: &str) -> Result<Self, ConfigError> {
        let url = parse_target(raw_url).map_err(|reason| ConfigError::InvalidTarget {
            target: raw_url.to_string(),
            reason,
        })?;
        let origin = origin_of(&url);
        let director = Director::new(&url)?;
        Ok(Self {
            template: template.into(),
            url,
            origin,
            director,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Full target URL; its path replaces the inbound path wholesale.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `scheme://host[:port]` of the target.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn director(&self) -> &Director {
        &self.director
    }
}

/// `scheme://host[:port]`, with default ports elided.
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Immutable mapping from path template to backend target.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<String, RouteTarget>,
}

impl RouteTable {
    /// Build the table from the configured template → URL map.
    pub fn from_config(routes: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let routes = routes
            .iter()
            .map(|(template, target)| {
                RouteTarget::new(template.clone(), target).map(|t| (template.clone(), t))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        tracing::debug!(count = routes.len(), "Route table built");
        Ok(Self { routes })
    }

    pub fn lookup(&self, template: &str) -> Option<&RouteTarget> {
        self.routes.get(template)
    }

    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
