use super::display_name;
use crate::model::{ModelTree, Node, NodeKind, ProtocolBlock};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct TypeTag {
    pub name: String,
    pub display_name: String,
}

/// One tag per distinct element name in the rendered model, sorted by name.
pub fn type_catalog(tree: &ModelTree) -> Vec<TypeTag> {
    let mut names: BTreeSet<&str> = BTreeSet::new();
    for node in tree.walk() {
        names.insert(node.element_name());
        if let Some(endpoint) = endpoint_element(node) {
            names.insert(endpoint);
        }
    }

    names
        .into_iter()
        .map(|name| TypeTag {
            name: name.to_string(),
            display_name: display_name(&format!("Type_{name}")),
        })
        .collect()
}

/// Inner endpoint element some protocol blocks render as a child.
pub(crate) fn endpoint_element(node: &Node) -> Option<&'static str> {
    match &node.kind {
        NodeKind::CommProtocol(p) => match p.block {
            ProtocolBlock::TwinCat { .. } => Some("TwinCat"),
            ProtocolBlock::EthernetIp { .. } => Some("EthernetIP"),
            ProtocolBlock::OpcUa { .. } => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CommProtocol, Primitive};
    use pretty_assertions::assert_eq;

    #[test]
    fn catalog_is_distinct_and_sorted() {
        let mut device = Node::new(
            NodeKind::AutomationDevice {
                shortcut: "PLC1".into(),
                root_address: "PLC1".into(),
            },
            "PLC1",
        );
        device.push(Node::new(
            NodeKind::CommProtocol(CommProtocol {
                simulation: false,
                vitality_check: false,
                block: ProtocolBlock::EthernetIp {
                    endpoint: "PlcCommPLC1".into(),
                    address: "10.0.0.6".into(),
                },
            }),
            "EthernetIPCommProtocolPLC1",
        ));
        let mut m = Node::new(NodeKind::Machine, "M01");
        m.push(Node::primitive("a", Primitive::new("Int32")));
        m.push(Node::primitive("b", Primitive::new("Int32")));
        device.push(m);
        device.push(Node::new(NodeKind::Machine, "M02"));

        let tree = ModelTree { devices: vec![device] };
        let names: Vec<String> = type_catalog(&tree).into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec!["AutomationDevice", "EthernetIP", "EthernetIPCommProtocol", "Machine", "Primitive"]
        );
        assert_eq!(
            type_catalog(&tree)[3].display_name,
            "Ima.Hmi.Module.Automation>Type_Machine"
        );
    }
}
