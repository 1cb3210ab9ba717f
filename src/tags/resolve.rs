//! Tag resolution: (key, protocol, coordinates) -> (data type, address).

use crate::device::ProtocolFamily;
use crate::error::ResolveError;
use crate::input::InformationModelRow;
use crate::tags::table::{Placeholder, Segment, TagTable};
use serde::Serialize;

/// Coordinates available for placeholder substitution.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagContext<'a> {
    pub machine: Option<&'a str>,
    pub station: Option<&'a str>,
    pub station_name: Option<&'a str>,
    pub actuator: Option<&'a str>,
    pub actuator_name: Option<&'a str>,
    pub wph: Option<u32>,
    pub nest: Option<u32>,
    pub parameter: Option<&'a str>,
}

impl<'a> TagContext<'a> {
    pub fn from_row(row: &'a InformationModelRow) -> Self {
        Self {
            machine: Some(&row.machine),
            station: Some(&row.station),
            station_name: Some(&row.station_name),
            actuator: Some(&row.actuator),
            actuator_name: Some(&row.actuator_name),
            ..Self::default()
        }
    }

    pub fn machine(machine: &'a str) -> Self {
        Self {
            machine: Some(machine),
            ..Self::default()
        }
    }

    pub fn with_wph(self, wph: Option<u32>) -> Self {
        Self { wph, ..self }
    }

    pub fn with_nest(self, nest: Option<u32>) -> Self {
        Self { nest, ..self }
    }

    pub fn with_parameter(self, parameter: &'a str) -> Self {
        Self {
            parameter: Some(parameter),
            ..self
        }
    }

    fn value(&self, p: Placeholder) -> Option<String> {
        match p {
            Placeholder::MachineNumber => self.machine.map(str::to_string),
            Placeholder::StationNumber => self.station.map(str::to_string),
            Placeholder::StationName => self.station_name.map(str::to_string),
            Placeholder::ActuatorNumber => self.actuator.map(str::to_string),
            Placeholder::ActuatorName => self.actuator_name.map(str::to_string),
            Placeholder::WphNumber => self.wph.map(|n| n.to_string()),
            Placeholder::NestNumber => self.nest.map(|n| n.to_string()),
            Placeholder::ParameterName => self.parameter.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTag {
    pub data_type: String,
    pub address: String,
}

/// Read-only view over a tag table.
#[derive(Debug, Clone, Copy)]
pub struct TagResolver<'a> {
    table: &'a TagTable,
}

impl<'a> TagResolver<'a> {
    pub fn new(table: &'a TagTable) -> Self {
        Self { table }
    }

    pub fn resolve(
        &self,
        key: &str,
        family: ProtocolFamily,
        row: &InformationModelRow,
        wph: Option<u32>,
        nest: Option<u32>,
    ) -> Result<ResolvedTag, ResolveError> {
        let ctx = TagContext::from_row(row).with_wph(wph).with_nest(nest);
        self.resolve_in(key, family, &ctx)
    }

    pub fn resolve_in(
        &self,
        key: &str,
        family: ProtocolFamily,
        ctx: &TagContext<'_>,
    ) -> Result<ResolvedTag, ResolveError> {
        let entry = self
            .table
            .get(key)
            .ok_or_else(|| ResolveError::UnknownTagKey(key.to_string()))?;

        let tag = entry
            .formats
            .get(&family)
            .ok_or_else(|| ResolveError::UnsupportedProtocolForTag {
                key: key.to_string(),
                family,
            })?;

        let mut address = String::with_capacity(tag.format.source.len());
        for seg in &tag.format.segments {
            match seg {
                Segment::Literal(s) => address.push_str(s),
                Segment::Placeholder(p) => {
                    let v = ctx
                        .value(*p)
                        .ok_or_else(|| ResolveError::IncompleteAddressContext {
                            key: key.to_string(),
                            placeholder: p.name().to_string(),
                        })?;
                    address.push_str(&v);
                }
            }
        }

        Ok(ResolvedTag {
            data_type: tag.data_type.clone(),
            address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row() -> InformationModelRow {
        InformationModelRow {
            device: "PLC1".into(),
            machine: "01".into(),
            station: "02".into(),
            station_name: "Fill".into(),
            actuator: "03".into(),
            actuator_type: "Act_Bin".into(),
            actuator_name: "Gripper".into(),
        }
    }

    #[test]
    fn resolves_station_state_for_opcua() {
        let table = TagTable::builtin().unwrap();
        let r = TagResolver::new(&table);
        let tag = r
            .resolve("Station_PackMl_State", ProtocolFamily::OpcUa, &row(), None, None)
            .unwrap();
        assert_eq!(
            tag,
            ResolvedTag {
                data_type: "Int32".into(),
                address: "MAIN_PRG._01_02_Fill.PackML.Sts_State".into(),
            }
        );
    }

    #[test]
    fn full_context_leaves_no_placeholders() {
        let table = TagTable::builtin().unwrap();
        let r = TagResolver::new(&table);
        let row = row();
        let ctx = TagContext::from_row(&row)
            .with_wph(Some(2))
            .with_nest(Some(4))
            .with_parameter("WaitingTime");
        for (key, entry) in table.entries() {
            for family in entry.formats.keys() {
                let tag = r.resolve_in(key, *family, &ctx).unwrap();
                assert!(!tag.address.is_empty(), "{key}/{family}");
                assert!(!tag.address.contains('{') && !tag.address.contains('}'), "{key}: {}", tag.address);
            }
        }
    }

    #[test]
    fn unknown_key_never_defaults() {
        let table = TagTable::builtin().unwrap();
        let r = TagResolver::new(&table);
        assert_eq!(
            r.resolve("no_such_tag", ProtocolFamily::Beckhoff, &row(), None, None),
            Err(ResolveError::UnknownTagKey("no_such_tag".into()))
        );
    }

    #[test]
    fn missing_family_column_is_reported() {
        let table = TagTable::builtin().unwrap();
        let r = TagResolver::new(&table);
        let err = r
            .resolve("station_node", ProtocolFamily::Siemens, &row(), None, None)
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnsupportedProtocolForTag {
                key: "station_node".into(),
                family: ProtocolFamily::Siemens,
            }
        );
    }

    #[test]
    fn optional_placeholders_only_required_when_referenced() {
        let table = TagTable::builtin().unwrap();
        let r = TagResolver::new(&table);
        // no wph/nest needed here
        assert!(r.resolve("actuator_node", ProtocolFamily::Beckhoff, &row(), None, None).is_ok());

        let err = r
            .resolve("shift_register_Station_Nest_Sts_Bad", ProtocolFamily::Beckhoff, &row(), Some(1), None)
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::IncompleteAddressContext {
                key: "shift_register_Station_Nest_Sts_Bad".into(),
                placeholder: "Nest_Number".into(),
            }
        );
    }

    #[test]
    fn machine_only_context() {
        let table = TagTable::builtin().unwrap();
        let r = TagResolver::new(&table);
        let tag = r
            .resolve_in("alarm_machine_group", ProtocolFamily::Beckhoff, &TagContext::machine("01"))
            .unwrap();
        assert_eq!(tag.address, "MAIN_PRG._01_Main");
    }
}
