use serde::{Deserialize, Serialize};
use std::fmt;

/// Dynamic value held in a port's data slot: a scalar or a sequence of values.
pub type Payload = serde_json::Value;

/// Controls whether `send` may fill an empty data slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendPolicy {
    /// `send` fails with `InvalidState` until the slot already holds data.
    #[default]
    RequirePriorData,
    AllowFirstWrite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRecord {
    port: u64,
    protocol: String,
    is_open: bool,
    data: Option<Payload>,
}

impl PortRecord {
    pub fn new(port: u64, protocol: impl Into<String>) -> Self {
        Self {
            port,
            protocol: protocol.into(),
            is_open: false,
            data: None,
        }
    }

    pub fn port(&self) -> u64 {
        self.port
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn data(&self) -> Option<&Payload> {
        self.data.as_ref()
    }

    pub(crate) fn set_open(&mut self, status: bool) -> bool {
        self.is_open = status;
        self.is_open
    }

    /// Callers must check `is_open` first.
    pub(crate) fn store(&mut self, payload: Payload) -> &Payload {
        self.data.insert(payload)
    }

    pub(crate) fn reset(&mut self) {
        self.is_open = false;
        self.data = None;
    }

    pub fn listing(&self) -> PortListing<'_> {
        PortListing { record: self }
    }
}

/// Human-readable block for one record, as emitted by `list`.
#[derive(Debug, Clone, Copy)]
pub struct PortListing<'a> {
    record: &'a PortRecord,
}

impl PortListing<'_> {
    pub fn port(&self) -> u64 {
        self.record.port
    }
}

impl fmt::Display for PortListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Port: {}", self.record.port)?;
        writeln!(f, "\tProtocol: {}", self.record.protocol)?;
        writeln!(f, "\tIsOpen: {}", self.record.is_open)?;
        match &self.record.data {
            Some(payload) => writeln!(f, "\tData: {}", display_payload(payload))?,
            None => writeln!(f, "\tData: nil")?,
        }
        write!(f, "---")
    }
}

/// Strings print bare; everything else prints as compact JSON.
pub fn display_payload(payload: &Payload) -> String {
    match payload {
        Payload::String(s) => s.clone(),
        other => other.to_string(),
    }
}
