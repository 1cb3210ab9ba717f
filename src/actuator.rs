//! Actuator templates: actuator type -> ordered primitive list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Primitive carrying the manual write command.
pub const COMMAND_PRIMITIVE: &str = "Cmd_Out";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitiveTemplate {
    pub name: String,
    pub data_type: String,
    /// Member appended to the actuator's controller address. `None` means the
    /// value is computed by the HMI and has no controller tag.
    #[serde(default)]
    pub tag_suffix: Option<String>,
}

impl PrimitiveTemplate {
    pub fn new(name: &str, data_type: &str, tag_suffix: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            tag_suffix: tag_suffix.map(str::to_string),
        }
    }

    pub fn is_command(&self) -> bool {
        self.name == COMMAND_PRIMITIVE
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActuatorTemplates {
    templates: BTreeMap<String, Vec<PrimitiveTemplate>>,
}

impl ActuatorTemplates {
    pub fn new(templates: impl IntoIterator<Item = (String, Vec<PrimitiveTemplate>)>) -> Self {
        Self {
            templates: templates.into_iter().collect(),
        }
    }

    pub fn builtin() -> Self {
        let binary = vec![
            PrimitiveTemplate::new("Sts_Inp", "Boolean", Some("Sts_Inp")),
            PrimitiveTemplate::new(COMMAND_PRIMITIVE, "Boolean", Some("Cmd_Out")),
            PrimitiveTemplate::new("Cycle_Time", "Int32", Some("Rep_dT")),
            PrimitiveTemplate::new("Sts_NoAlm", "Boolean", Some("Sts_NoAlm")),
            PrimitiveTemplate::new("Sts_Auth", "Boolean", None),
            PrimitiveTemplate::new("Sts_State", "Boolean", None),
            PrimitiveTemplate::new("Sts_Mode", "Boolean", None),
            PrimitiveTemplate::new("Sts_inter", "Boolean", Some("Cfg_NoInterlock")),
        ];
        Self::new([
            ("Act_Bin".to_string(), binary),
            // placeholder type: declared in the sheets, no signals yet
            ("Act_Bix".to_string(), Vec::new()),
        ])
    }

    pub fn get(&self, actuator_type: &str) -> Option<&[PrimitiveTemplate]> {
        self.templates.get(actuator_type).map(Vec::as_slice)
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}
