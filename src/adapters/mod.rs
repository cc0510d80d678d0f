// Adapters layer: concrete FlowSource implementations for external systems
// (flow API over HTTP, local CSV/zip snapshots, in-memory row sets).

pub mod csv_source;
pub mod http_source;
pub mod memory_source;

pub use csv_source::CsvFlowSource;
pub use http_source::HttpFlowSource;
pub use memory_source::MemoryFlowSource;
