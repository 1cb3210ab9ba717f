//! Tree builder: grows the information model from normalized rows.
//!
//! Assembly order per device is fixed: protocol descriptor, machines
//! (ascending), alarms. A failure inside one item (actuator, station, alarm,
//! parameter) skips that item with a diagnostic; an unknown device aborts.

pub mod actuator;
pub mod alarms;
pub mod device;
pub mod group;
pub mod machine;
pub mod shift_register;
pub mod station;

pub use shift_register::RegisterScope;

use crate::actuator::ActuatorTemplates;
use crate::device::{DeviceRegistry, ProtocolFamily};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::BuildError;
use crate::ids::IdAllocator;
use crate::input::{AlarmRecord, InformationModelRow, ParameterRecord};
use crate::model::{ModelTree, Node, NodeKind, Primitive};
use crate::tags::{ResolvedTag, TagContext, TagResolver, TagTable};
use serde::Serialize;
use std::collections::BTreeMap;

/// Device being built: its name and the protocol its addresses use.
#[derive(Debug, Clone, Copy)]
pub struct DeviceScope<'a> {
    pub name: &'a str,
    pub family: ProtocolFamily,
}

/// Result of one generation run.
#[derive(Debug, Serialize)]
pub struct BuildOutput {
    pub tree: ModelTree,
    /// Alarm rows, in input order, for the alarm text exporters.
    pub alarms: Vec<AlarmRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct TreeBuilder<'a> {
    tags: TagResolver<'a>,
    devices: &'a DeviceRegistry,
    actuators: &'a ActuatorTemplates,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(
        tags: &'a TagTable,
        devices: &'a DeviceRegistry,
        actuators: &'a ActuatorTemplates,
    ) -> Self {
        Self {
            tags: TagResolver::new(tags),
            devices,
            actuators,
        }
    }

    /// Build every device found in `rows`, sharing one identifier allocator.
    pub fn build_model(
        &self,
        rows: &[InformationModelRow],
        alarms: &[AlarmRecord],
        parameters: &[ParameterRecord],
        ids: &mut IdAllocator,
    ) -> Result<BuildOutput, BuildError> {
        let mut diags = Diagnostics::new();

        let mut by_device: BTreeMap<&str, Vec<&InformationModelRow>> = BTreeMap::new();
        for row in rows {
            by_device.entry(row.device.as_str()).or_default().push(row);
        }

        for alarm in alarms {
            if !by_device.contains_key(alarm.device.as_str()) {
                diags.warn(
                    format!("{}/alarm {}", alarm.device, alarm.input),
                    "device has no information model rows, alarm ignored",
                );
            }
        }

        let mut tree = ModelTree::default();
        for (device, device_rows) in &by_device {
            let device_alarms: Vec<&AlarmRecord> =
                alarms.iter().filter(|a| a.device == *device).collect();
            let device_params: Vec<&ParameterRecord> =
                parameters.iter().filter(|p| p.device == *device).collect();

            let node = self.build_automation_device(
                device,
                device_rows,
                &device_alarms,
                &device_params,
                ids,
                &mut diags,
            )?;
            tree.devices.push(node);
        }

        tracing::info!(
            devices = tree.devices.len(),
            ids = ids.issued(),
            diagnostics = diags.len(),
            "information model built"
        );

        Ok(BuildOutput {
            tree,
            alarms: alarms.to_vec(),
            diagnostics: diags.into_vec(),
        })
    }

    fn resolve(
        &self,
        key: &str,
        dev: DeviceScope<'_>,
        row: &InformationModelRow,
    ) -> Result<ResolvedTag, BuildError> {
        Ok(self.tags.resolve(key, dev.family, row, None, None)?)
    }

    fn resolve_in(
        &self,
        key: &str,
        dev: DeviceScope<'_>,
        ctx: &TagContext<'_>,
    ) -> Result<ResolvedTag, BuildError> {
        Ok(self.tags.resolve_in(key, dev.family, ctx)?)
    }
}

/// `GenericOutbound` wrapper around a single `Data` primitive.
pub(crate) fn generic_outbound(name: &str, data: Primitive, ids: &mut IdAllocator) -> Node {
    let mut node = Node::new(NodeKind::GenericOutbound, name)
        .with_scope(name)
        .with_id(ids.next());
    node.push(Node::primitive("Data", data));
    node
}

/// Controller tag reference as written in the model (`//` + address).
pub(crate) fn plc_ref(address: &str) -> String {
    format!("//{address}")
}

pub(crate) fn row_subject(row: &InformationModelRow) -> String {
    format!(
        "{}/M{}/ST{}/ACT{} ({})",
        row.device, row.machine, row.station, row.actuator, row.actuator_name
    )
}
