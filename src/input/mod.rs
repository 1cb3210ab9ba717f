//! Normalized tabular inputs (information model, alarms, parameters).

pub mod parse;
pub mod row;

pub use parse::{load_alarms, load_information_model, load_parameters, read_information_model};
pub use row::{AlarmRecord, InformationModelRow, ParameterRecord};
