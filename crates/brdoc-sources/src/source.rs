//! The data-source pull abstraction.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::descriptor::{DataSourceDescriptor, DataSourceResult};

/// Parameters of a fetch, keyed by parameter name.
pub type FetchParams = BTreeMap<String, Value>;

/// A named pull-query over SQL, REST, or a subprocess.
///
/// Implementations are stateless apart from connection handles and must
/// never propagate transport errors: a failed fetch is reported inside
/// the returned envelope.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Static descriptor (name, kind, parameter schema).
    fn descriptor(&self) -> DataSourceDescriptor;

    /// Execute the source with the given parameters.
    async fn fetch(&self, params: &FetchParams) -> DataSourceResult;
}
