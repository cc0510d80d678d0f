pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, QueryCommand};

pub use adapters::{CsvFlowSource, HttpFlowSource, MemoryFlowSource};
pub use core::engine::{DependencyEngine, EngineSettings};
pub use domain::model::{
    ComparisonResult, FlowRecord, FlowScope, RankedResult, SeriesResult,
};
pub use domain::ports::FlowSource;
pub use utils::error::{IcioError, Result};
