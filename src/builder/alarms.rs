//! `Alarms` folder: one Int32 word per alarm group.
//!
//! Alarm inputs look like `_<machine>_<station>_Alms.<word>.<bit>`. The group
//! is the input without its bit; station `00` (or the alarm word right after
//! the machine, as in `_01_Alms.L2`) addresses the machine's main program.
//! Machine and station numbers match rows numerically, so `_01_02` finds a
//! row written as station `2`.

use super::group::NumberKey;
use super::{DeviceScope, TreeBuilder};
use crate::device::ProtocolFamily;
use crate::diagnostics::Diagnostics;
use crate::error::BuildError;
use crate::input::{AlarmRecord, InformationModelRow};
use crate::model::{Node, NodeKind, Primitive};
use crate::tags::TagContext;
use std::collections::BTreeSet;

const MACHINE_LEVEL_STATION: &str = "00";
const ALARM_WORD_PREFIX: &str = "Alms";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmGroup<'a> {
    pub machine: &'a str,
    /// `None` for machine-level groups.
    pub station: Option<&'a str>,
    pub member: &'a str,
}

pub fn parse_alarm_group(group: &str) -> Result<AlarmGroup<'_>, BuildError> {
    let malformed = |reason: &str| BuildError::MalformedAlarmPath {
        path: group.to_string(),
        reason: reason.to_string(),
    };

    let (head, member) = group
        .split_once('.')
        .ok_or_else(|| malformed("missing '.<word>' member"))?;
    if member.is_empty() {
        return Err(malformed("empty member"));
    }
    let head = head
        .strip_prefix('_')
        .ok_or_else(|| malformed("must start with '_'"))?;

    let tokens: Vec<&str> = head.split('_').collect();
    let machine = tokens.first().copied().unwrap_or_default();
    if machine.is_empty() {
        return Err(malformed("missing machine number"));
    }

    let station = match tokens.len() {
        0 | 1 => return Err(malformed("missing alarm word")),
        2 if tokens[1].starts_with(ALARM_WORD_PREFIX) => None,
        2 => return Err(malformed("expected alarm word after machine number")),
        _ if NumberKey::new(tokens[1]).same_number(&NumberKey::new(MACHINE_LEVEL_STATION)) => None,
        _ if tokens[1].is_empty() => return Err(malformed("empty station number")),
        _ => Some(tokens[1]),
    };

    Ok(AlarmGroup {
        machine,
        station,
        member,
    })
}

impl TreeBuilder<'_> {
    /// Folder with one primitive per distinct alarm group, in first-seen order.
    ///
    /// Returns `None` when the device protocol has no alarm word type.
    pub fn build_alarms(
        &self,
        dev: DeviceScope<'_>,
        rows: &[&InformationModelRow],
        alarms: &[&AlarmRecord],
        diags: &mut Diagnostics,
    ) -> Option<Node> {
        let data_type = match dev.family {
            ProtocolFamily::Beckhoff | ProtocolFamily::OpcUa | ProtocolFamily::Rockwell => "Int32",
            ProtocolFamily::Siemens => {
                diags.warn(
                    format!("{}/alarms", dev.name),
                    BuildError::UnsupportedProtocolFamily(dev.family),
                );
                return None;
            }
        };

        let mut folder = Node::new(NodeKind::Folder, "Alarms");
        let mut seen = BTreeSet::new();

        for alarm in alarms {
            let Some(group) = alarm.group() else {
                diags.warn(
                    format!("{}/alarm {}", dev.name, alarm.input),
                    BuildError::MalformedAlarmPath {
                        path: alarm.input.clone(),
                        reason: "no bit index".to_string(),
                    },
                );
                continue;
            };
            if !seen.insert(group) {
                continue;
            }

            match self.alarm_address(dev, rows, group) {
                Ok(address) => folder.push(Node::primitive(group, Primitive::tagged(data_type, address))),
                Err(e) => diags.warn(format!("{}/alarm {}", dev.name, group), e),
            }
        }

        Some(folder)
    }

    fn alarm_address(
        &self,
        dev: DeviceScope<'_>,
        rows: &[&InformationModelRow],
        group: &str,
    ) -> Result<String, BuildError> {
        let parsed = parse_alarm_group(group)?;
        let machine = NumberKey::new(parsed.machine);

        let tag = match parsed.station {
            None => {
                let Some(row) = rows
                    .iter()
                    .find(|r| NumberKey::new(&r.machine).same_number(&machine))
                else {
                    return Err(BuildError::MalformedAlarmPath {
                        path: group.to_string(),
                        reason: format!("machine {} not in information model", parsed.machine),
                    });
                };
                self.resolve_in("alarm_machine_group", dev, &TagContext::machine(&row.machine))?
            }
            Some(station) => {
                let station_key = NumberKey::new(station);
                let row = rows
                    .iter()
                    .find(|r| {
                        NumberKey::new(&r.machine).same_number(&machine)
                            && NumberKey::new(&r.station).same_number(&station_key)
                    })
                    .ok_or_else(|| BuildError::MalformedAlarmPath {
                        path: group.to_string(),
                        reason: format!("station {}/{} not in information model", parsed.machine, station),
                    })?;
                self.resolve("alarm_station_group", dev, row)?
            }
        };

        Ok(format!("{}.{}", tag.address, parsed.member))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::ActuatorTemplates;
    use crate::device::DeviceRegistry;
    use crate::tags::TagTable;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_station_and_machine_groups() {
        assert_eq!(
            parse_alarm_group("_01_02_Alms.L1").unwrap(),
            AlarmGroup {
                machine: "01",
                station: Some("02"),
                member: "L1",
            }
        );
        assert_eq!(parse_alarm_group("_01_00_Alms.L2").unwrap().station, None);
        assert_eq!(parse_alarm_group("_01_Alms.L2").unwrap().station, None);
        assert_eq!(parse_alarm_group("_01_0_Alms.L2").unwrap().station, None);
    }

    #[test]
    fn rejects_malformed_groups() {
        for bad in [
            "Alms.L1",
            "_01_02_Alms",
            "__02_Alms.L1",
            "_01.L1",
            "_01_02_Alms.",
            "_01_02.L1",
        ] {
            assert!(
                matches!(parse_alarm_group(bad), Err(BuildError::MalformedAlarmPath { .. })),
                "{bad}"
            );
        }
    }

    fn row(station: &str, name: &str) -> InformationModelRow {
        InformationModelRow {
            device: "PLC1".into(),
            machine: "01".into(),
            station: station.into(),
            station_name: name.into(),
            actuator: "03".into(),
            actuator_type: "Act_Bin".into(),
            actuator_name: "Gripper".into(),
        }
    }

    fn alarm(input: &str) -> AlarmRecord {
        AlarmRecord {
            device: "PLC1".into(),
            name: format!("Alarm{input}"),
            input: input.into(),
            acknowledge: String::new(),
            message: "msg".into(),
        }
    }

    #[test]
    fn groups_are_deduplicated_and_bad_rows_skipped() {
        crate::logging::init_test();
        let tags = TagTable::builtin().unwrap();
        let reg = DeviceRegistry::default();
        let acts = ActuatorTemplates::builtin();
        let b = TreeBuilder::new(&tags, &reg, &acts);
        let mut diags = Diagnostics::new();
        let dev = DeviceScope {
            name: "PLC1",
            family: ProtocolFamily::Beckhoff,
        };

        let r = row("02", "Fill");
        let alarms = [
            alarm("_01_02_Alms.L1.0"),
            alarm("_01_02_Alms.L1.1"),
            alarm("_01_09_Alms.L1.0"),
            alarm("_01_00_Alms.L2.0"),
            alarm("garbage"),
        ];
        let refs: Vec<&AlarmRecord> = alarms.iter().collect();
        let folder = b.build_alarms(dev, &[&r], &refs, &mut diags).unwrap();

        let got: Vec<(&str, &str)> = folder
            .children
            .iter()
            .map(|n| {
                (
                    n.name.as_str(),
                    n.primitive_payload().and_then(|p| p.plc_tag.as_deref()).unwrap_or_default(),
                )
            })
            .collect();
        assert_eq!(
            got,
            vec![
                ("_01_02_Alms.L1", "MAIN_PRG._01_02_Fill.L1"),
                ("_01_00_Alms.L2", "MAIN_PRG._01_Main.L2"),
            ]
        );
        // unknown station 09 + missing bit index
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().any(|d| d.subject == "PLC1/alarm _01_09_Alms.L1"));
    }

    #[test]
    fn lookup_matches_unpadded_row_numbers() {
        let tags = TagTable::builtin().unwrap();
        let reg = DeviceRegistry::default();
        let acts = ActuatorTemplates::builtin();
        let b = TreeBuilder::new(&tags, &reg, &acts);
        let mut diags = Diagnostics::new();
        let dev = DeviceScope {
            name: "PLC1",
            family: ProtocolFamily::Beckhoff,
        };

        let mut r = row("2", "Fill");
        r.machine = "1".into();
        let alarms = [alarm("_01_02_Alms.L1.0"), alarm("_01_00_Alms.L3.0"), alarm("_01_02.L1.0")];
        let refs: Vec<&AlarmRecord> = alarms.iter().collect();
        let folder = b.build_alarms(dev, &[&r], &refs, &mut diags).unwrap();

        let addrs: Vec<Option<&str>> = folder
            .children
            .iter()
            .map(|n| n.primitive_payload().and_then(|p| p.plc_tag.as_deref()))
            .collect();
        assert_eq!(addrs, vec![Some("MAIN_PRG._1_2_Fill.L1"), Some("MAIN_PRG._1_Main.L3")]);

        // no alarm word: not silently promoted to the machine program
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.iter().next().unwrap().subject, "PLC1/alarm _01_02.L1");
    }

    #[test]
    fn siemens_has_no_alarm_word_type() {
        let tags = TagTable::builtin().unwrap();
        let reg = DeviceRegistry::default();
        let acts = ActuatorTemplates::builtin();
        let b = TreeBuilder::new(&tags, &reg, &acts);
        let mut diags = Diagnostics::new();
        let dev = DeviceScope {
            name: "S7",
            family: ProtocolFamily::Siemens,
        };
        assert!(b.build_alarms(dev, &[], &[], &mut diags).is_none());
        assert_eq!(diags.len(), 1);
    }
}
