// Domain layer: core models, task records and ports (interfaces).

pub mod model;
pub mod ports;
pub mod task;
