// Domain layer: core models and ports (interfaces). No dependencies on
// adapters or transport; serde only where records cross a boundary.

pub mod model;
pub mod ports;
