use crate::domain::model::{FlowRecord, FlowScope};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The one interface the engine consumes. A source answers a bounded scope
/// query with raw flow rows, in no particular order and with no
/// pre-aggregation beyond what the scope asks for. Zero rows is a valid
/// answer ("no data for scope"), not a failure.
#[async_trait]
pub trait FlowSource: Send + Sync {
    async fn fetch(&self, scope: &FlowScope) -> Result<Vec<FlowRecord>>;

    /// Cheap reachability probe, surfaced through the engine's health check.
    async fn ping(&self) -> Result<()>;
}

/// Configuration surface the engine needs. Implemented by both the CLI
/// and the TOML configuration.
pub trait ConfigProvider: Send + Sync {
    fn tolerance(&self) -> f64;
    fn max_limit(&self) -> usize;
    fn year_min(&self) -> i32;
    fn year_max(&self) -> i32;
}
