use super::group::{NumberKey, group_by};
use super::{DeviceScope, TreeBuilder};
use crate::device::{ADS_PORT, DeviceDescriptor};
use crate::diagnostics::Diagnostics;
use crate::error::BuildError;
use crate::ids::IdAllocator;
use crate::input::{AlarmRecord, InformationModelRow, ParameterRecord};
use crate::model::{CommProtocol, Node, NodeKind, ProtocolBlock};

impl TreeBuilder<'_> {
    /// Device node with its protocol block, machines and alarm folder.
    ///
    /// An unknown device is fatal: there is no protocol to resolve against.
    pub fn build_automation_device(
        &self,
        device: &str,
        rows: &[&InformationModelRow],
        alarms: &[&AlarmRecord],
        parameters: &[&ParameterRecord],
        ids: &mut IdAllocator,
        diags: &mut Diagnostics,
    ) -> Result<Node, BuildError> {
        let descriptor = self.devices.get(device)?;
        let dev = DeviceScope {
            name: device,
            family: descriptor.family(),
        };
        tracing::debug!(device, family = %dev.family, rows = rows.len(), "building automation device");

        let mut node = Node::new(
            NodeKind::AutomationDevice {
                shortcut: device.to_string(),
                root_address: device.to_string(),
            },
            device,
        )
        .with_id(ids.next());

        match self.build_protocol_descriptor(device, descriptor, ids) {
            Ok(protocol) => node.push(protocol),
            Err(e) => diags.warn(device, e),
        }

        for (machine, machine_rows) in group_by(rows, |r| NumberKey::new(&r.machine)) {
            match self.build_machine(dev, &machine_rows, parameters, ids, diags) {
                Ok(m) => node.push(m),
                Err(e) => diags.warn(format!("{}/M{}", device, machine.0), e),
            }
        }

        if let Some(folder) = self.build_alarms(dev, rows, alarms, diags) {
            node.push(folder);
        }

        Ok(node)
    }

    /// Exactly one protocol block per device; Siemens has no driver.
    pub fn build_protocol_descriptor(
        &self,
        device: &str,
        descriptor: &DeviceDescriptor,
        ids: &mut IdAllocator,
    ) -> Result<Node, BuildError> {
        let (name, block) = match descriptor {
            DeviceDescriptor::Ads {
                address,
                local_net_id,
                remote_net_id,
            } => (
                format!("TwinCatProtocol{device}"),
                ProtocolBlock::TwinCat {
                    endpoint: format!("PlcComm{device}"),
                    address: address.clone(),
                    port: ADS_PORT,
                    local_net_id: local_net_id.clone(),
                    remote_net_id: remote_net_id.clone(),
                },
            ),
            DeviceDescriptor::OpcUa {
                address,
                namespace_uri,
                port,
            } => (
                format!("OpcUaProtocol{device}"),
                ProtocolBlock::OpcUa {
                    address: address.clone(),
                    port: *port,
                    namespace_uri: namespace_uri.clone(),
                    logging: true,
                },
            ),
            DeviceDescriptor::EthernetIp { address } => (
                format!("EthernetIPCommProtocol{device}"),
                ProtocolBlock::EthernetIp {
                    endpoint: format!("PlcComm{device}"),
                    address: address.clone(),
                },
            ),
            DeviceDescriptor::Siemens { .. } => {
                return Err(BuildError::UnsupportedProtocolFamily(descriptor.family()));
            }
        };

        let protocol = CommProtocol {
            simulation: false,
            vitality_check: false,
            block,
        };
        Ok(Node::new(NodeKind::CommProtocol(protocol), name).with_id(ids.next()))
    }
}
