//! Side documents derived from a finished build: the type-tag catalog and
//! the alarm list with its translation table.

pub mod alarms;
pub mod catalog;

pub use alarms::{TranslationItem, alarm_list, alarm_translations};
pub use catalog::{TypeTag, type_catalog};

/// Translation namespace the HMI resolves display names against.
pub const DISPLAY_NAMESPACE: &str = "Ima.Hmi.Module.Automation";

fn display_name(text_id: &str) -> String {
    format!("{DISPLAY_NAMESPACE}>{text_id}")
}
