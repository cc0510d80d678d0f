use crate::domain::model::{FlowRecord, FlowScope};
use crate::domain::ports::FlowSource;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Flow source backed by an in-memory row set. Used by tests and by
/// callers that embed the engine with a pre-loaded snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryFlowSource {
    rows: Vec<FlowRecord>,
}

impl MemoryFlowSource {
    pub fn new(rows: Vec<FlowRecord>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl FlowSource for MemoryFlowSource {
    async fn fetch(&self, scope: &FlowScope) -> Result<Vec<FlowRecord>> {
        Ok(self
            .rows
            .iter()
            .filter(|row| scope.matches(row))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
