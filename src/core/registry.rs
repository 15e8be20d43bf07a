use crate::config::toml_config::RegistryConfig;
use crate::domain::model::{Payload, PortListing, PortRecord, SendPolicy};
use crate::domain::ports::PortTable;
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::{validate_port, validate_protocol};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Write;

/// Owns every port record. Callers hold the instance and pass it around
/// explicitly; access is single-threaded through `&mut self`.
#[derive(Debug, Clone, Default)]
pub struct PortRegistry {
    ports: HashMap<u64, PortRecord>,
    send_policy: SendPolicy,
}

impl PortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_send_policy(send_policy: SendPolicy) -> Self {
        Self {
            ports: HashMap::new(),
            send_policy,
        }
    }

    /// Builds a registry with the configured send policy and preset ports.
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let mut registry = Self::with_send_policy(config.send_policy());

        for preset in config.presets() {
            registry.create(preset.port, &preset.protocol)?;
            if preset.open.unwrap_or(false) {
                registry.set_open(preset.port, true)?;
            }
        }

        tracing::info!(
            "Registry ready with {} preset port(s), send policy {:?}",
            registry.len(),
            registry.send_policy
        );
        Ok(registry)
    }

    pub fn send_policy(&self) -> SendPolicy {
        self.send_policy
    }

    pub fn create(&mut self, port: i64, protocol: &str) -> Result<&PortRecord> {
        let key = validate_port("port", port)?;
        validate_protocol("protocol", protocol)?;

        match self.ports.entry(key) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyExists { port: key }),
            Entry::Vacant(slot) => {
                tracing::debug!("Created port {} ({})", key, protocol);
                Ok(slot.insert(PortRecord::new(key, protocol)))
            }
        }
    }

    pub fn delete(&mut self, port: i64) -> Result<()> {
        let key = validate_port("port", port)?;
        let record = self
            .ports
            .get_mut(&key)
            .ok_or(RegistryError::NotFound { port: key })?;

        record.reset();
        self.ports.remove(&key);
        tracing::debug!("Deleted port {}", key);
        Ok(())
    }

    /// Returns the new open flag so callers can chain on it.
    pub fn set_open(&mut self, port: i64, status: bool) -> Result<bool> {
        let record = self.record_mut(port)?;
        let is_open = record.set_open(status);
        tracing::debug!("Port {} is_open = {}", record.port(), is_open);
        Ok(is_open)
    }

    /// Overwrites the port's data slot.
    ///
    /// Under [`SendPolicy::RequirePriorData`] a send to a port whose slot is
    /// still empty fails with `InvalidState`, so a freshly created port can
    /// never receive its first payload this way.
    pub fn send(&mut self, port: i64, data: Payload) -> Result<&Payload> {
        let policy = self.send_policy;
        let record = self.record_mut(port)?;

        if data.is_null() {
            return Err(RegistryError::invalid_argument(
                "data",
                "payload cannot be null",
            ));
        }

        if !record.is_open() {
            return Err(RegistryError::NotOpen {
                port: record.port(),
            });
        }

        if record.data().is_none() && policy == SendPolicy::RequirePriorData {
            return Err(RegistryError::InvalidState {
                port: record.port(),
                reason: "data slot is unset".to_string(),
            });
        }

        tracing::debug!("Stored payload on port {}", record.port());
        Ok(record.store(data))
    }

    pub fn receive(&self, port: i64) -> Result<&Payload> {
        let record = self.record(port)?;

        if !record.is_open() {
            return Err(RegistryError::NotOpen {
                port: record.port(),
            });
        }

        record.data().ok_or_else(|| RegistryError::InvalidState {
            port: record.port(),
            reason: "data slot is unset".to_string(),
        })
    }

    /// Writes every record to standard error. Order follows map iteration.
    pub fn list(&self) {
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        if let Err(e) = self.list_to(&mut handle) {
            tracing::warn!("Failed to write port listing: {}", e);
        }
    }

    pub fn list_to(&self, out: &mut dyn Write) -> Result<()> {
        for listing in self.records() {
            writeln!(out, "{}", listing)?;
        }
        Ok(())
    }

    /// Lazily formatted records, in map iteration order.
    pub fn records(&self) -> impl Iterator<Item = PortListing<'_>> + '_ {
        self.ports.values().map(PortRecord::listing)
    }

    pub fn get(&self, port: u64) -> Option<&PortRecord> {
        self.ports.get(&port)
    }

    pub fn contains(&self, port: u64) -> bool {
        self.ports.contains_key(&port)
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    fn record(&self, port: i64) -> Result<&PortRecord> {
        let key = validate_port("port", port)?;
        self.ports
            .get(&key)
            .ok_or(RegistryError::NotFound { port: key })
    }

    fn record_mut(&mut self, port: i64) -> Result<&mut PortRecord> {
        let key = validate_port("port", port)?;
        self.ports
            .get_mut(&key)
            .ok_or(RegistryError::NotFound { port: key })
    }
}

impl PortTable for PortRegistry {
    fn create(&mut self, port: i64, protocol: &str) -> Result<&PortRecord> {
        PortRegistry::create(self, port, protocol)
    }

    fn delete(&mut self, port: i64) -> Result<()> {
        PortRegistry::delete(self, port)
    }

    fn set_open(&mut self, port: i64, status: bool) -> Result<bool> {
        PortRegistry::set_open(self, port, status)
    }

    fn send(&mut self, port: i64, data: Payload) -> Result<&Payload> {
        PortRegistry::send(self, port, data)
    }

    fn receive(&self, port: i64) -> Result<&Payload> {
        PortRegistry::receive(self, port)
    }

    fn list_to(&self, out: &mut dyn Write) -> Result<()> {
        PortRegistry::list_to(self, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing_text(registry: &PortRegistry) -> String {
        let mut buf = Vec::new();
        registry.list_to(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_create_returns_closed_empty_record() {
        let mut registry = PortRegistry::new();
        let record = registry.create(5, "HTTP").unwrap();

        assert_eq!(record.port(), 5);
        assert_eq!(record.protocol(), "HTTP");
        assert!(!record.is_open());
        assert!(record.data().is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_create_rejects_bad_arguments() {
        let mut registry = PortRegistry::new();

        assert!(matches!(
            registry.create(-3, "HTTP"),
            Err(RegistryError::InvalidArgument { .. })
        ));
        assert!(matches!(
            registry.create(5, ""),
            Err(RegistryError::InvalidArgument { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_create_fails() {
        let mut registry = PortRegistry::new();
        registry.create(5, "HTTP").unwrap();

        let err = registry.create(5, "HTTP").unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyExists { port: 5 }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_create_then_delete_leaves_registry_unchanged() {
        let mut registry = PortRegistry::new();
        registry.create(1, "SSH").unwrap();
        let before = listing_text(&registry);

        registry.create(5, "HTTP").unwrap();
        registry.delete(5).unwrap();

        assert_eq!(listing_text(&registry), before);
        assert!(!registry.contains(5));
    }

    #[test]
    fn test_unknown_port_operations_fail_not_found() {
        let mut registry = PortRegistry::new();

        assert!(matches!(
            registry.delete(9),
            Err(RegistryError::NotFound { port: 9 })
        ));
        assert!(matches!(
            registry.set_open(9, true),
            Err(RegistryError::NotFound { port: 9 })
        ));
        assert!(matches!(
            registry.send(9, json!("x")),
            Err(RegistryError::NotFound { port: 9 })
        ));
        assert!(matches!(
            registry.send(9, Payload::Null),
            Err(RegistryError::NotFound { port: 9 })
        ));
        assert!(matches!(
            registry.receive(9),
            Err(RegistryError::NotFound { port: 9 })
        ));
    }

    #[test]
    fn test_send_on_closed_port_fails_not_open_under_default_policy() {
        let mut registry = PortRegistry::new();
        registry.create(5, "HTTP").unwrap();

        assert_eq!(registry.send_policy(), SendPolicy::RequirePriorData);
        assert!(matches!(
            registry.send(5, json!("x")),
            Err(RegistryError::NotOpen { port: 5 })
        ));
    }

    #[test]
    fn test_list_writes_to_stderr_without_touching_records() {
        let mut registry = PortRegistry::new();
        registry.list();

        registry.create(5, "HTTP").unwrap();
        registry.set_open(5, true).unwrap();
        registry.list();

        assert_eq!(registry.len(), 1);
        assert!(registry.get(5).unwrap().is_open());
        assert!(registry.get(5).unwrap().data().is_none());
    }

    #[test]
    fn test_delete_rejects_negative_port() {
        let mut registry = PortRegistry::new();
        assert!(matches!(
            registry.delete(-1),
            Err(RegistryError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_set_open_returns_new_status() {
        let mut registry = PortRegistry::new();
        registry.create(5, "HTTP").unwrap();

        assert!(registry.set_open(5, true).unwrap());
        assert!(registry.get(5).unwrap().is_open());
        assert!(!registry.set_open(5, false).unwrap());
        assert!(!registry.get(5).unwrap().is_open());
    }

    #[test]
    fn test_first_send_fails_with_invalid_state_under_default_policy() {
        // Known quirk: an empty slot blocks the first send.
        let mut registry = PortRegistry::new();
        registry.create(5, "HTTP").unwrap();
        registry.set_open(5, true).unwrap();

        let err = registry.send(5, json!("hello")).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidState { port: 5, .. }));
        assert!(registry.get(5).unwrap().data().is_none());
    }

    #[test]
    fn test_send_on_closed_port_fails_not_open() {
        let mut registry = PortRegistry::with_send_policy(SendPolicy::AllowFirstWrite);
        registry.create(5, "HTTP").unwrap();

        assert!(matches!(
            registry.send(5, json!(1)),
            Err(RegistryError::NotOpen { port: 5 })
        ));
    }

    #[test]
    fn test_send_rejects_null_payload() {
        let mut registry = PortRegistry::with_send_policy(SendPolicy::AllowFirstWrite);
        registry.create(5, "HTTP").unwrap();
        registry.set_open(5, true).unwrap();

        assert!(matches!(
            registry.send(5, Payload::Null),
            Err(RegistryError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_send_then_receive_with_first_write_allowed() {
        let mut registry = PortRegistry::with_send_policy(SendPolicy::AllowFirstWrite);
        registry.create(5, "HTTP").unwrap();
        registry.set_open(5, true).unwrap();

        assert_eq!(registry.send(5, json!("first")).unwrap(), &json!("first"));
        assert_eq!(
            registry.send(5, json!(["a", 2])).unwrap(),
            &json!(["a", 2])
        );
        assert_eq!(registry.receive(5).unwrap(), &json!(["a", 2]));
        // receive does not consume the slot
        assert_eq!(registry.receive(5).unwrap(), &json!(["a", 2]));
    }

    #[test]
    fn test_receive_requires_open_port_and_data() {
        let mut registry = PortRegistry::new();
        registry.create(5, "HTTP").unwrap();

        assert!(matches!(
            registry.receive(5),
            Err(RegistryError::NotOpen { port: 5 })
        ));

        registry.set_open(5, true).unwrap();
        assert!(matches!(
            registry.receive(5),
            Err(RegistryError::InvalidState { port: 5, .. })
        ));
    }

    #[test]
    fn test_closing_port_keeps_data_but_blocks_receive() {
        let mut registry = PortRegistry::with_send_policy(SendPolicy::AllowFirstWrite);
        registry.create(5, "HTTP").unwrap();
        registry.set_open(5, true).unwrap();
        registry.send(5, json!(42)).unwrap();
        registry.set_open(5, false).unwrap();

        assert!(matches!(
            registry.receive(5),
            Err(RegistryError::NotOpen { port: 5 })
        ));
        assert_eq!(registry.get(5).unwrap().data(), Some(&json!(42)));
    }

    #[test]
    fn test_recreate_after_delete_yields_fresh_record() {
        let mut registry = PortRegistry::with_send_policy(SendPolicy::AllowFirstWrite);
        registry.create(5, "HTTP").unwrap();
        registry.set_open(5, true).unwrap();
        registry.send(5, json!("stale")).unwrap();
        registry.delete(5).unwrap();

        let record = registry.create(5, "FTP").unwrap();
        assert_eq!(record.protocol(), "FTP");
        assert!(!record.is_open());
        assert!(record.data().is_none());
    }

    #[test]
    fn test_list_emits_single_record_block() {
        let mut registry = PortRegistry::new();
        registry.create(5, "HTTP").unwrap();

        assert_eq!(
            listing_text(&registry),
            "Port: 5\n\tProtocol: HTTP\n\tIsOpen: false\n\tData: nil\n---\n"
        );
    }

    #[test]
    fn test_records_yields_one_listing_per_port() {
        let mut registry = PortRegistry::new();
        registry.create(1, "SSH").unwrap();
        registry.create(2, "SMTP").unwrap();
        registry.create(3, "DNS").unwrap();

        let mut ports: Vec<u64> = registry.records().map(|l| l.port()).collect();
        ports.sort_unstable();
        assert_eq!(ports, vec![1, 2, 3]);
    }

    #[test]
    fn test_list_on_empty_registry_writes_nothing() {
        let registry = PortRegistry::new();
        assert!(listing_text(&registry).is_empty());
    }
}
