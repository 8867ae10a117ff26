use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;

/// Read-only access to the remote catalog.
///
/// `path` is rooted at the service (`/api/spells`, `/api/spells/fireball`);
/// implementations own the base URL and any retry policy.
pub trait CatalogSource: Send + Sync {
    fn fetch_json(&self, path: &str) -> impl Future<Output = Result<Value>> + Send;
}

impl<C: CatalogSource> CatalogSource for Arc<C> {
    fn fetch_json(&self, path: &str) -> impl Future<Output = Result<Value>> + Send {
        (**self).fetch_json(path)
    }
}
