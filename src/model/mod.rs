//! Information model tree handed to the renderers.
//!
//! Every node owns its children; order is document order.

use crate::ids::HmiId;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    AutomationDevice {
        shortcut: String,
        root_address: String,
    },
    CommProtocol(CommProtocol),
    Machine,
    Station,
    Actuator {
        actuator_type: String,
    },
    ShiftRegister,
    Wph,
    Nest,
    GenericOutbound,
    Primitive(Primitive),
    Folder,
    Alarm(AlarmEntry),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommProtocol {
    pub simulation: bool,
    pub vitality_check: bool,
    pub block: ProtocolBlock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "driver", rename_all = "snake_case")]
pub enum ProtocolBlock {
    TwinCat {
        endpoint: String,
        address: String,
        port: u16,
        local_net_id: String,
        remote_net_id: String,
    },
    OpcUa {
        address: String,
        port: u16,
        namespace_uri: String,
        logging: bool,
    },
    EthernetIp {
        endpoint: String,
        address: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Primitive {
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plc_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_set: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tag: Option<String>,
}

impl Primitive {
    pub fn new(data_type: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            ..Self::default()
        }
    }

    pub fn tagged(data_type: impl Into<String>, plc_tag: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            plc_tag: Some(plc_tag.into()),
            ..Self::default()
        }
    }

    pub fn with_can_set(mut self, can_set: impl Into<String>) -> Self {
        self.can_set = Some(can_set.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlarmEntry {
    pub display_name: String,
    pub severity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hmi_id: Option<HmiId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            scope_id: None,
            hmi_id: None,
            tags: None,
            children: Vec::new(),
        }
    }

    pub fn primitive(name: impl Into<String>, primitive: Primitive) -> Self {
        Self::new(NodeKind::Primitive(primitive), name)
    }

    pub fn with_scope(mut self, scope_id: impl Into<String>) -> Self {
        self.scope_id = Some(scope_id.into());
        self
    }

    pub fn with_id(mut self, id: HmiId) -> Self {
        self.hmi_id = Some(id);
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Element name in the HMI dialect.
    pub fn element_name(&self) -> &str {
        match &self.kind {
            NodeKind::AutomationDevice { .. } => "AutomationDevice",
            NodeKind::CommProtocol(p) => match p.block {
                ProtocolBlock::TwinCat { .. } => "TwinCatCommProtocol",
                ProtocolBlock::OpcUa { .. } => "OpcUaCommProtocol",
                ProtocolBlock::EthernetIp { .. } => "EthernetIPCommProtocol",
            },
            NodeKind::Machine => "Machine",
            NodeKind::Station => "Station",
            NodeKind::Actuator { actuator_type } => actuator_type,
            NodeKind::ShiftRegister => "ShiftRegister",
            NodeKind::Wph => "Wph",
            NodeKind::Nest => "Nest",
            NodeKind::GenericOutbound => "GenericOutbound",
            NodeKind::Primitive(_) => "Primitive",
            NodeKind::Folder => "Folder",
            NodeKind::Alarm(_) => "Alarm",
        }
    }

    /// Plain elements (Primitive, Folder) live in the default namespace;
    /// everything else is an automation (`da:`) element.
    pub fn is_automation_element(&self) -> bool {
        !matches!(self.kind, NodeKind::Primitive(_) | NodeKind::Folder)
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn primitive_payload(&self) -> Option<&Primitive> {
        match &self.kind {
            NodeKind::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// Pre-order traversal including `self`.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Output of one generation run: one root per automation device.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelTree {
    pub devices: Vec<Node>,
}

impl ModelTree {
    pub fn walk(&self) -> impl Iterator<Item = &Node> {
        self.devices.iter().flat_map(Node::walk)
    }

    pub fn device(&self, name: &str) -> Option<&Node> {
        self.devices.iter().find(|d| d.name == name)
    }

    pub fn hmi_ids(&self) -> Vec<HmiId> {
        self.walk().filter_map(|n| n.hmi_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn walk_is_preorder() {
        let mut root = Node::new(NodeKind::Folder, "root");
        let mut a = Node::new(NodeKind::Folder, "a");
        a.push(Node::primitive("a1", Primitive::new("Int32")));
        root.push(a);
        root.push(Node::new(NodeKind::Folder, "b"));

        let names: Vec<&str> = root.walk().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["root", "a", "a1", "b"]);
    }

    #[test]
    fn actuator_element_is_its_type() {
        let n = Node::new(
            NodeKind::Actuator {
                actuator_type: "Act_Bin".into(),
            },
            "ACT03",
        );
        assert_eq!(n.element_name(), "Act_Bin");
        assert!(n.is_automation_element());
        assert!(!Node::new(NodeKind::Folder, "Alarms").is_automation_element());
    }
}
