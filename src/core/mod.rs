pub mod meters;
pub mod publisher;
pub mod registry;

pub use crate::domain::meter_id::MeterId;
pub use crate::domain::ports::{Writer, WriterType};
pub use crate::utils::error::Result;
