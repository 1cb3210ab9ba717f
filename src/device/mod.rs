//! Controller descriptors and the device registry.
//!
//! One descriptor per physical controller, keyed by the device name used in
//! the tabular inputs. The registry is built once and never mutated.

use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_OPCUA_PORT: u16 = 4940;
pub const ADS_PORT: u16 = 851;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProtocolFamily {
    /// Beckhoff TwinCAT over ADS.
    Beckhoff,
    OpcUa,
    /// Rockwell over EtherNet/IP.
    Rockwell,
    /// Reserved, no driver.
    Siemens,
}

impl ProtocolFamily {
    pub const ALL: [ProtocolFamily; 4] = [
        ProtocolFamily::Beckhoff,
        ProtocolFamily::OpcUa,
        ProtocolFamily::Rockwell,
        ProtocolFamily::Siemens,
    ];

    /// Column prefix used by the tag table CSV ("Beckhoff Type", "OpcUa Format", ...).
    pub fn column_name(self) -> &'static str {
        match self {
            ProtocolFamily::Beckhoff => "Beckhoff",
            ProtocolFamily::OpcUa => "OpcUa",
            ProtocolFamily::Rockwell => "Rockwell",
            ProtocolFamily::Siemens => "Siemens",
        }
    }

    pub fn from_column_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column_name() == s)
    }
}

impl fmt::Display for ProtocolFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Connection settings for one controller.
///
/// JSON shape (config file):
/// { "protocol": "opc_ua", "address": "10.0.0.5", "namespace_uri": "urn:x" }
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "snake_case")]
pub enum DeviceDescriptor {
    Ads {
        address: String,
        local_net_id: String,
        remote_net_id: String,
    },
    OpcUa {
        address: String,
        namespace_uri: String,
        #[serde(default = "default_opcua_port")]
        port: u16,
    },
    EthernetIp {
        address: String,
    },
    Siemens {
        address: String,
    },
}

fn default_opcua_port() -> u16 {
    DEFAULT_OPCUA_PORT
}

impl DeviceDescriptor {
    pub fn opcua(address: impl Into<String>, namespace_uri: impl Into<String>) -> Self {
        DeviceDescriptor::OpcUa {
            address: address.into(),
            namespace_uri: namespace_uri.into(),
            port: DEFAULT_OPCUA_PORT,
        }
    }

    pub fn family(&self) -> ProtocolFamily {
        match self {
            DeviceDescriptor::Ads { .. } => ProtocolFamily::Beckhoff,
            DeviceDescriptor::OpcUa { .. } => ProtocolFamily::OpcUa,
            DeviceDescriptor::EthernetIp { .. } => ProtocolFamily::Rockwell,
            DeviceDescriptor::Siemens { .. } => ProtocolFamily::Siemens,
        }
    }

    pub fn address(&self) -> &str {
        match self {
            DeviceDescriptor::Ads { address, .. }
            | DeviceDescriptor::OpcUa { address, .. }
            | DeviceDescriptor::EthernetIp { address }
            | DeviceDescriptor::Siemens { address } => address,
        }
    }
}

/// Immutable name -> descriptor lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceRegistry {
    devices: BTreeMap<String, DeviceDescriptor>,
}

impl DeviceRegistry {
    pub fn new(devices: impl IntoIterator<Item = (String, DeviceDescriptor)>) -> Self {
        Self {
            devices: devices.into_iter().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Result<&DeviceDescriptor, BuildError> {
        self.devices
            .get(name)
            .ok_or_else(|| BuildError::UnknownDevice(name.to_string()))
    }

    pub fn family(&self, name: &str) -> Result<ProtocolFamily, BuildError> {
        self.get(name).map(DeviceDescriptor::family)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn opcua_port_defaults_when_missing() {
        let json = r#"{ "protocol": "opc_ua", "address": "10.0.0.5", "namespace_uri": "urn:x" }"#;
        let d: DeviceDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d, DeviceDescriptor::opcua("10.0.0.5", "urn:x"));
        assert_eq!(d.family(), ProtocolFamily::OpcUa);
    }

    #[test]
    fn registry_reports_unknown_device() {
        let reg = DeviceRegistry::new([(
            "PLC1".to_string(),
            DeviceDescriptor::EthernetIp {
                address: "172.16.228.92".into(),
            },
        )]);
        assert_eq!(reg.family("PLC1").unwrap(), ProtocolFamily::Rockwell);
        assert_eq!(
            reg.get("PLC9").unwrap_err(),
            BuildError::UnknownDevice("PLC9".into())
        );
    }

    #[test]
    fn ads_descriptor_parses_net_ids() {
        let json = r#"{
            "protocol": "ads",
            "address": "172.16.224.79",
            "local_net_id": "172.27.192.1.1.1",
            "remote_net_id": "172.16.224.79.1.1"
        }"#;
        let d: DeviceDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.family(), ProtocolFamily::Beckhoff);
        assert_eq!(d.address(), "172.16.224.79");
    }
}
