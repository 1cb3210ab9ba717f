use super::group::NumberKey;
use super::shift_register::RegisterScope;
use super::{DeviceScope, TreeBuilder, generic_outbound, plc_ref, row_subject};
use crate::diagnostics::Diagnostics;
use crate::error::BuildError;
use crate::ids::IdAllocator;
use crate::input::{InformationModelRow, ParameterRecord};
use crate::model::{Node, NodeKind, Primitive};
use crate::tags::TagContext;
use std::collections::BTreeMap;

pub const STATION_REGISTER_WPHS: u32 = 2;
pub const STATION_REGISTER_NESTS: u32 = 4;
const STATION_FLAGS: [&str; 2] = ["Sts_Idle", "Sts_NoAlm"];

impl TreeBuilder<'_> {
    /// Station `ST<nr>`: state, idle/no-alarm flags, parameters, station
    /// register, then one actuator per (number, name) pair.
    pub fn build_station(
        &self,
        dev: DeviceScope<'_>,
        rows: &[&InformationModelRow],
        parameters: &[&ParameterRecord],
        ids: &mut IdAllocator,
        diags: &mut Diagnostics,
    ) -> Result<Node, BuildError> {
        let Some(first) = rows.first() else {
            return Err(BuildError::EmptyGroup(format!("{} station", dev.name)));
        };
        let name = format!("ST{}", first.station);

        let state = self.resolve("Station_PackMl_State", dev, first)?;
        let station_node = self.resolve("station_node", dev, first)?;

        let mut station = Node::new(NodeKind::Station, &name)
            .with_scope(&name)
            .with_id(ids.next());

        station.push(generic_outbound(
            "PackMlState",
            Primitive::tagged(state.data_type, plc_ref(&state.address)),
            ids,
        ));
        for flag in STATION_FLAGS {
            station.push(generic_outbound(
                flag,
                Primitive::tagged("Boolean", plc_ref(&format!("{}.{}", station_node.address, flag))),
                ids,
            ));
        }

        station.push(self.build_parameters(dev, first, parameters, ids, diags));

        match self.build_shift_register(
            dev,
            &format!("ShiftRegister{name}"),
            first,
            STATION_REGISTER_WPHS,
            STATION_REGISTER_NESTS,
            RegisterScope::Station,
            ids,
        ) {
            Ok(register) => station.push(register),
            Err(e) => diags.warn(format!("{}/M{}/{}/ShiftRegister", dev.name, first.machine, name), e),
        }

        // (number, name) -> rows, ascending by actuator number
        let mut actuators: BTreeMap<(NumberKey, String), Vec<&InformationModelRow>> = BTreeMap::new();
        for row in rows {
            actuators
                .entry((NumberKey::new(&row.actuator), row.actuator_name.clone()))
                .or_default()
                .push(*row);
        }

        for act_rows in actuators.values() {
            match self.build_actuator(dev, act_rows, ids) {
                Ok(a) => station.push(a),
                Err(e) => diags.warn(row_subject(act_rows[0]), e),
            }
        }

        Ok(station)
    }

    /// `Parameters` folder with one writable outbound per station parameter.
    pub fn build_parameters(
        &self,
        dev: DeviceScope<'_>,
        station: &InformationModelRow,
        parameters: &[&ParameterRecord],
        ids: &mut IdAllocator,
        diags: &mut Diagnostics,
    ) -> Node {
        let mut folder = Node::new(NodeKind::Folder, "Parameters");

        let machine = NumberKey::new(&station.machine);
        let station_nr = NumberKey::new(&station.station);
        let matching = parameters.iter().filter(|p| {
            p.device == station.device
                && NumberKey::new(&p.machine).same_number(&machine)
                && NumberKey::new(&p.station).same_number(&station_nr)
        });

        for param in matching {
            let subject = match &param.actuator {
                Some(act) => format!(
                    "{}/M{}/ST{}/ACT{}/parameter {}",
                    dev.name, station.machine, station.station, act, param.name
                ),
                None => format!(
                    "{}/M{}/ST{}/parameter {}",
                    dev.name, station.machine, station.station, param.name
                ),
            };

            let ctx = TagContext::from_row(station).with_parameter(&param.name);
            let tag = match self.resolve_in("parameter_node", dev, &ctx) {
                Ok(t) => t,
                Err(e) => {
                    diags.warn(subject, e);
                    continue;
                }
            };
            // reported, not skipped
            if let Some(problem) = param.limits_problem() {
                diags.warn(subject, problem);
            }

            let data = Primitive {
                data_type: param.data_type.clone(),
                plc_tag: Some(plc_ref(&tag.address)),
                can_set: Some("true".to_string()),
                min_tag: Some(plc_ref(&format!("{}Min", tag.address))),
                max_tag: Some(plc_ref(&format!("{}Max", tag.address))),
            };
            let mut node = generic_outbound(&param.name, data, ids);
            node.tags = Some("Type/Parameter".to_string());
            folder.push(node);
        }

        folder
    }
}
