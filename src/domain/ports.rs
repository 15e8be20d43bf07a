use crate::domain::model::{Payload, PortRecord};
use crate::utils::error::Result;
use std::io::Write;

/// Operations a port table exposes to the command engine.
pub trait PortTable {
    fn create(&mut self, port: i64, protocol: &str) -> Result<&PortRecord>;
    fn delete(&mut self, port: i64) -> Result<()>;
    fn set_open(&mut self, port: i64, status: bool) -> Result<bool>;
    fn send(&mut self, port: i64, data: Payload) -> Result<&Payload>;
    fn receive(&self, port: i64) -> Result<&Payload>;
    fn list_to(&self, out: &mut dyn Write) -> Result<()>;
}
