use serde::{Deserialize, Serialize};

/// One actuator instance of the information model sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InformationModelRow {
    #[serde(rename = "AutomationDevice")]
    pub device: String,
    #[serde(rename = "Machine")]
    pub machine: String,
    #[serde(rename = "Station")]
    pub station: String,
    #[serde(rename = "StationName")]
    pub station_name: String,
    #[serde(rename = "Actuator")]
    pub actuator: String,
    #[serde(rename = "ActuatorType")]
    pub actuator_type: String,
    #[serde(rename = "ActuatorName")]
    pub actuator_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmRecord {
    #[serde(rename = "AutomationDevice")]
    pub device: String,
    #[serde(rename = "AlarmName")]
    pub name: String,
    /// e.g. `_01_02_Alms.L1.3` (group `_01_02_Alms.L1`, bit 3).
    #[serde(rename = "AlarmInput")]
    pub input: String,
    #[serde(rename = "AlarmAcknowledge", default)]
    pub acknowledge: String,
    #[serde(rename = "AlarmMessage", default)]
    pub message: String,
}

impl AlarmRecord {
    /// Input path without its last dotted segment; `None` when there is no dot.
    pub fn group(&self) -> Option<&str> {
        self.input.rfind('.').map(|i| &self.input[..i])
    }
}

/// Station parameter (one row of a `Pars` block).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    #[serde(rename = "AutomationDevice")]
    pub device: String,
    #[serde(rename = "Machine")]
    pub machine: String,
    #[serde(rename = "Station")]
    pub station: String,
    #[serde(rename = "Actuator", default)]
    pub actuator: Option<String>,
    #[serde(rename = "ParameterName")]
    pub name: String,
    #[serde(rename = "DataType", default = "default_parameter_type")]
    pub data_type: String,
    #[serde(rename = "Minimum", default)]
    pub minimum: Option<f64>,
    #[serde(rename = "Value", default)]
    pub value: Option<f64>,
    #[serde(rename = "Maximum", default)]
    pub maximum: Option<f64>,
}

impl ParameterRecord {
    /// Limits that contradict each other or the default value.
    pub fn limits_problem(&self) -> Option<String> {
        match (self.minimum, self.value, self.maximum) {
            (Some(min), _, Some(max)) if min > max => {
                Some(format!("minimum {min} is above maximum {max}"))
            }
            (Some(min), Some(v), _) if v < min => Some(format!("value {v} is below minimum {min}")),
            (_, Some(v), Some(max)) if v > max => Some(format!("value {v} is above maximum {max}")),
            _ => None,
        }
    }
}

fn default_parameter_type() -> String {
    "Int32".to_string()
}
