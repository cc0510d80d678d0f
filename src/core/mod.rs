pub mod compare;
pub mod engine;
pub mod format;
pub mod normalizer;
pub mod ranking;
pub mod series;

pub use crate::domain::model::{DependencyRecord, FlowRecord, FlowScope};
pub use crate::domain::ports::{ConfigProvider, FlowSource};
pub use crate::utils::error::Result;
