pub mod command;
pub mod engine;
pub mod registry;

pub use crate::domain::model::{Payload, PortListing, PortRecord, SendPolicy};
pub use crate::domain::ports::PortTable;
pub use crate::utils::error::Result;
