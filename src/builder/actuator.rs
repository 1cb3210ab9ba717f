use super::{DeviceScope, TreeBuilder, generic_outbound, plc_ref};
use crate::error::BuildError;
use crate::ids::IdAllocator;
use crate::input::InformationModelRow;
use crate::model::{Node, NodeKind, Primitive};

/// Binding that lets operators drive the command output by hand.
pub const MANUAL_ACTION_BINDING: &str = "{path:{Rights}/ManualActionEnable}";

impl TreeBuilder<'_> {
    /// One actuator node from the template registered for its type.
    ///
    /// `rows` share actuator number and name; the first row decides the type.
    pub fn build_actuator(
        &self,
        dev: DeviceScope<'_>,
        rows: &[&InformationModelRow],
        ids: &mut IdAllocator,
    ) -> Result<Node, BuildError> {
        let Some(row) = rows.first() else {
            return Err(BuildError::EmptyGroup(format!("{} actuator", dev.name)));
        };

        let template = self
            .actuators
            .get(&row.actuator_type)
            .ok_or_else(|| BuildError::UnsupportedActuatorType(row.actuator_type.clone()))?;

        let base = self.resolve("actuator_node", dev, row)?;

        let mut actuator = Node::new(
            NodeKind::Actuator {
                actuator_type: row.actuator_type.clone(),
            },
            format!("ACT{}", row.actuator),
        )
        .with_scope(format!(
            "_{}_{}_{}_{}",
            row.machine, row.station, row.actuator, row.actuator_name
        ))
        .with_id(ids.next());

        for prim in template {
            let mut data = match &prim.tag_suffix {
                Some(suffix) => {
                    Primitive::tagged(&prim.data_type, plc_ref(&format!("{}.{}", base.address, suffix)))
                }
                None => Primitive::new(&prim.data_type),
            };
            if prim.is_command() {
                data = data.with_can_set(MANUAL_ACTION_BINDING);
            }
            actuator.push(generic_outbound(&prim.name, data, ids));
        }

        tracing::debug!(actuator = %actuator.name, primitives = template.len(), "actuator built");
        Ok(actuator)
    }
}
