use super::group::{NumberKey, group_by};
use super::shift_register::RegisterScope;
use super::{DeviceScope, TreeBuilder, generic_outbound, plc_ref};
use crate::diagnostics::Diagnostics;
use crate::error::BuildError;
use crate::ids::IdAllocator;
use crate::input::{InformationModelRow, ParameterRecord};
use crate::model::{Node, NodeKind, Primitive};

pub const LINE_REGISTER_NAME: &str = "Loop01";
pub const LINE_REGISTER_WPHS: u32 = 160;
pub const LINE_REGISTER_NESTS: u32 = 4;

impl TreeBuilder<'_> {
    /// Machine `M<nr>`: PackML state/mode, its stations, then the line register.
    ///
    /// `rows` must all belong to one machine and be non-empty.
    pub fn build_machine(
        &self,
        dev: DeviceScope<'_>,
        rows: &[&InformationModelRow],
        parameters: &[&ParameterRecord],
        ids: &mut IdAllocator,
        diags: &mut Diagnostics,
    ) -> Result<Node, BuildError> {
        let Some(first) = rows.first() else {
            return Err(BuildError::EmptyGroup(format!("{} machine", dev.name)));
        };
        let name = format!("M{}", first.machine);

        let state = self.resolve("Machine_PackMl_State", dev, first)?;
        let mode = self.resolve("Machine_PackMl_Mode", dev, first)?;

        let mut machine = Node::new(NodeKind::Machine, &name)
            .with_scope(&name)
            .with_id(ids.next());
        machine.push(generic_outbound(
            "PackMlState",
            Primitive::tagged(state.data_type, plc_ref(&state.address)),
            ids,
        ));
        machine.push(generic_outbound(
            "PackMlMode",
            Primitive::tagged(mode.data_type, plc_ref(&mode.address)),
            ids,
        ));

        for (station, station_rows) in group_by(rows, |r| NumberKey::new(&r.station)) {
            match self.build_station(dev, &station_rows, parameters, ids, diags) {
                Ok(s) => machine.push(s),
                Err(e) => diags.warn(format!("{}/{}/ST{}", dev.name, name, station.0), e),
            }
        }

        match self.build_shift_register(
            dev,
            LINE_REGISTER_NAME,
            first,
            LINE_REGISTER_WPHS,
            LINE_REGISTER_NESTS,
            RegisterScope::Line,
            ids,
        ) {
            Ok(register) => machine.push(register),
            Err(e) => diags.warn(format!("{}/{}/{}", dev.name, name, LINE_REGISTER_NAME), e),
        }

        Ok(machine)
    }
}
