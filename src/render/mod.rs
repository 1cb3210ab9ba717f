//! Output documents: XML for the HMI runtime, JSON for inspection.

pub mod xml;

pub use xml::{
    render_alarm_list, render_alarm_translations, render_information_model, render_project_tags,
};

use crate::builder::BuildOutput;

pub const MAIN_MODEL_FILE: &str = "MainInformationModel.xml";
pub const PROJECT_TAGS_FILE: &str = "ProjectTags.xml";
pub const ALARM_LIST_FILE: &str = "Alarms.xml";
pub const ALARM_TRANSLATION_FILE: &str = "en-US_Ima.Hmi.Module.Automation.Alarm.xml";
pub const JSON_DUMP_FILE: &str = "information_model.json";

/// Whole build (tree, alarms, diagnostics) as pretty JSON.
pub fn render_json(output: &BuildOutput) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(output)?)
}
