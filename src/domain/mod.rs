// Domain layer: meter identity, wire model and the writer port. No I/O here.

pub mod meter_id;
pub mod meter_type;
pub mod model;
pub mod ports;
