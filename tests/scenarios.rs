use infomodel_gen::actuator::ActuatorTemplates;
use infomodel_gen::builder::TreeBuilder;
use infomodel_gen::device::{DeviceDescriptor, DeviceRegistry};
use infomodel_gen::error::BuildError;
use infomodel_gen::ids::IdAllocator;
use infomodel_gen::input::{AlarmRecord, InformationModelRow};
use infomodel_gen::model::{Node, NodeKind, ProtocolBlock};
use infomodel_gen::tags::TagTable;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

fn row(station: &str, station_name: &str, actuator: &str, kind: &str, name: &str) -> InformationModelRow {
    InformationModelRow {
        device: "PLC1".into(),
        machine: "01".into(),
        station: station.into(),
        station_name: station_name.into(),
        actuator: actuator.into(),
        actuator_type: kind.into(),
        actuator_name: name.into(),
    }
}

fn alarm(name: &str, input: &str) -> AlarmRecord {
    AlarmRecord {
        device: "PLC1".into(),
        name: name.into(),
        input: input.into(),
        acknowledge: String::new(),
        message: format!("{name} raised"),
    }
}

fn opcua_registry() -> DeviceRegistry {
    DeviceRegistry::new([("PLC1".to_string(), DeviceDescriptor::opcua("10.0.0.5", "urn:x"))])
}

fn path<'a>(root: &'a Node, names: &[&str]) -> &'a Node {
    names
        .iter()
        .fold(root, |node, name| node.child(name).unwrap_or_else(|| panic!("missing {name}")))
}

#[test]
fn opcua_device_with_one_binary_actuator() {
    let tags = TagTable::builtin().unwrap();
    let devices = opcua_registry();
    let templates = ActuatorTemplates::builtin();
    let builder = TreeBuilder::new(&tags, &devices, &templates);

    let rows = [row("02", "Fill", "03", "Act_Bin", "Gripper")];
    let out = builder
        .build_model(&rows, &[], &[], &mut IdAllocator::new())
        .unwrap();
    assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);

    let device = out.tree.device("PLC1").unwrap();
    let protocol = &device.children[0];
    assert_eq!(protocol.element_name(), "OpcUaCommProtocol");
    match &protocol.kind {
        NodeKind::CommProtocol(p) => assert_eq!(
            p.block,
            ProtocolBlock::OpcUa {
                address: "10.0.0.5".into(),
                port: 4940,
                namespace_uri: "urn:x".into(),
                logging: true,
            }
        ),
        other => panic!("unexpected {other:?}"),
    }

    let actuator = path(device, &["M01", "ST02", "ACT03"]);
    assert_eq!(actuator.element_name(), "Act_Bin");
    assert_eq!(actuator.children.len(), 8);
    let cmd = path(actuator, &["Cmd_Out", "Data"]).primitive_payload().unwrap();
    assert_eq!(cmd.plc_tag.as_deref(), Some("//MAIN_PRG._01_02_Fill._03_Gripper.Cmd_Out"));
}

#[test]
fn machine_level_alarm_addresses_main_program() {
    let tags = TagTable::builtin().unwrap();
    let devices = opcua_registry();
    let templates = ActuatorTemplates::builtin();
    let builder = TreeBuilder::new(&tags, &devices, &templates);

    let rows = [row("02", "Fill", "03", "Act_Bin", "Gripper")];
    let alarms = [alarm("Alarm_1", "_01_00_Alms.L2.0"), alarm("Alarm_2", "_01_00_Alms.L2.1")];
    let out = builder
        .build_model(&rows, &alarms, &[], &mut IdAllocator::new())
        .unwrap();

    let folder = path(out.tree.device("PLC1").unwrap(), &["Alarms"]);
    assert_eq!(folder.children.len(), 1);
    let word = folder.children[0].primitive_payload().unwrap();
    assert_eq!(folder.children[0].name, "_01_00_Alms.L2");
    assert_eq!(word.data_type, "Int32");
    assert_eq!(word.plc_tag.as_deref(), Some("MAIN_PRG._01_Main.L2"));
    assert_eq!(out.alarms.len(), 2);
}

#[test]
fn unsupported_actuator_is_skipped_with_a_diagnostic() {
    let tags = TagTable::builtin().unwrap();
    let devices = opcua_registry();
    let templates = ActuatorTemplates::builtin();
    let builder = TreeBuilder::new(&tags, &devices, &templates);

    let rows = [
        row("02", "Fill", "03", "Act_Bin", "Gripper"),
        row("02", "Fill", "04", "Act_Unknown", "Lifter"),
    ];
    let out = builder
        .build_model(&rows, &[], &[], &mut IdAllocator::new())
        .unwrap();

    let station = path(out.tree.device("PLC1").unwrap(), &["M01", "ST02"]);
    assert!(station.child("ACT03").is_some());
    assert!(station.child("ACT04").is_none());

    assert_eq!(out.diagnostics.len(), 1);
    assert!(out.diagnostics[0].message.contains("Act_Unknown"));
}

#[test]
fn unknown_device_aborts_the_build() {
    let tags = TagTable::builtin().unwrap();
    let devices = DeviceRegistry::default();
    let templates = ActuatorTemplates::builtin();
    let builder = TreeBuilder::new(&tags, &devices, &templates);

    let rows = [row("02", "Fill", "03", "Act_Bin", "Gripper")];
    let err = builder
        .build_model(&rows, &[], &[], &mut IdAllocator::new())
        .unwrap_err();
    assert_eq!(err, BuildError::UnknownDevice("PLC1".into()));
}

#[test]
fn identifiers_are_unique_and_builds_are_repeatable() {
    let tags = TagTable::builtin().unwrap();
    let devices = DeviceRegistry::new([
        ("PLC1".to_string(), DeviceDescriptor::opcua("10.0.0.5", "urn:x")),
        ("PLC2".to_string(), DeviceDescriptor::EthernetIp { address: "10.0.0.6".into() }),
    ]);
    let templates = ActuatorTemplates::builtin();
    let builder = TreeBuilder::new(&tags, &devices, &templates);

    let mut rows = vec![
        row("02", "Fill", "03", "Act_Bin", "Gripper"),
        row("10", "Cap", "01", "Act_Bin", "Pusher"),
        row("03", "Seal", "02", "Act_Bix", "Heater"),
    ];
    let mut other = row("01", "Load", "01", "Act_Bin", "Feeder");
    other.device = "PLC2".into();
    rows.push(other);

    let mut ids = IdAllocator::new();
    let first = builder.build_model(&rows, &[], &[], &mut ids).unwrap();

    let all = first.tree.hmi_ids();
    let distinct: BTreeSet<_> = all.iter().copied().collect();
    assert_eq!(all.len(), distinct.len());
    assert_eq!(all.len() as u32, ids.issued());

    // stations come out in numeric order regardless of input order
    let m01 = path(first.tree.device("PLC1").unwrap(), &["M01"]);
    let stations: Vec<&str> = m01
        .children
        .iter()
        .filter(|c| c.kind == NodeKind::Station)
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(stations, vec!["ST02", "ST03", "ST10"]);

    ids.reset();
    let second = builder.build_model(&rows, &[], &[], &mut ids).unwrap();
    assert_eq!(first.tree, second.tree);
    assert_eq!(first.diagnostics, second.diagnostics);
}
