// Domain layer: port records and the table interface the engine drives.

pub mod model;
pub mod ports;
