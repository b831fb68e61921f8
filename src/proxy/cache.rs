//! Per-origin proxy handle cache.
//!
//! # Responsibilities
//! - Hand out one shared `ProxyHandle` per backend origin
//! - Create handles lazily on the first request to an origin
//!
//! # Design Decisions
//! - Creation happens under the shard write lock of a `DashMap` entry, so
//!   concurrent first requests to the same origin serialize and observe a
//!   single handle
//! - Handles live for the process lifetime; nothing is evicted

use std::sync::Arc;

use dashmap::DashMap;

use crate::error::ConfigError;
use crate::observability::metrics;
use crate::proxy::handle::{ForwardSettings, HttpClient, ProxyHandle};

/// Origin → handle map shared by all requests.
#[derive(Debug)]
pub struct ProxyCache {
    handles: DashMap<String, Arc<ProxyHandle>>,
    client: HttpClient,
    settings: ForwardSettings,
}

impl ProxyCache {
    pub fn new(client: HttpClient, settings: ForwardSettings) -> Self {
        Self {
            handles: DashMap::new(),
            client,
            settings,
        }
    }

    /// Return the handle for `origin`, creating it if this is the first request.
    pub fn get_or_create(&self, origin: &str) -> Result<Arc<ProxyHandle>, ConfigError> {
        if let Some(handle) = self.handles.get(origin) {
            return Ok(Arc::clone(handle.value()));
        }

        let entry = self
            .handles
            .entry(origin.to_string())
            .or_try_insert_with(|| {
                let handle = ProxyHandle::new(origin, self.client.clone(), self.settings)?;
                tracing::info!(origin = %origin, "Created proxy handle");
                metrics::record_handle_created(origin);
                Ok::<_, ConfigError>(Arc::new(handle))
            })?;

        Ok(Arc::clone(entry.value()))
    }

    pub fn contains(&self, origin: &str) -> bool {
        self.handles.contains_key(origin)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeoutConfig;
    use crate::proxy::handle::build_client;

    fn cache() -> ProxyCache {
        ProxyCache::new(build_client(&TimeoutConfig::default()), ForwardSettings::default())
    }

    #[test]
    fn test_reuses_handle() {
        let cache = cache();
        let a = cache.get_or_create("http://backend:9000").unwrap();
        let b = cache.get_or_create("http://backend:9000").unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_origins() {
        let cache = cache();
        let a = cache.get_or_create("http://users:9000").unwrap();
        let b = cache.get_or_create("http://orders:9000").unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_invalid_origin_not_cached() {
        let cache = cache();
        assert!(cache.get_or_create("::not-an-origin").is_err());
        assert!(cache.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_first_requests_share_one_handle() {
        let cache = Arc::new(cache());
        let barrier = Arc::new(tokio::sync::Barrier::new(32));

        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                tokio::spawn(async move {
                    barrier.wait().await;
                    cache.get_or_create("http://backend:9000").unwrap()
                })
            })
            .collect();

        let mut handles = Vec::new();
        for task in tasks {
            handles.push(task.await.unwrap());
        }

        assert_eq!(cache.len(), 1);
        assert!(handles.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
