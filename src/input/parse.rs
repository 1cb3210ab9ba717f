use crate::input::row::{AlarmRecord, InformationModelRow, ParameterRecord};
use anyhow::{Context, bail};
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;

/// Load normalized information-model rows.
///
/// Expected header:
/// AutomationDevice,Machine,Station,StationName,Actuator,ActuatorType,ActuatorName
///
/// The source sheets write actuator numbers as `_03`; underscores are dropped.
pub fn load_information_model(path: impl AsRef<Path>) -> anyhow::Result<Vec<InformationModelRow>> {
    let path = path.as_ref();
    let rows: Vec<InformationModelRow> = read_csv_path(path)?;
    normalize_model_rows(rows).with_context(|| format!("information model {}", path.display()))
}

pub fn load_alarms(path: impl AsRef<Path>) -> anyhow::Result<Vec<AlarmRecord>> {
    let path = path.as_ref();
    let rows: Vec<AlarmRecord> = read_csv_path(path)?;
    Ok(rows
        .into_iter()
        .filter(|a| !a.input.trim().is_empty())
        .map(|mut a| {
            a.device = a.device.trim().to_string();
            a.input = a.input.trim().to_string();
            a
        })
        .collect())
}

pub fn load_parameters(path: impl AsRef<Path>) -> anyhow::Result<Vec<ParameterRecord>> {
    let rows: Vec<ParameterRecord> = read_csv_path(path.as_ref())?;
    Ok(rows
        .into_iter()
        .filter(|p| !p.name.trim().is_empty())
        .map(|mut p| {
            if p.data_type.trim().is_empty() {
                p.data_type = "Int32".to_string();
            }
            p.actuator = p.actuator.filter(|a| !a.trim().is_empty());
            p
        })
        .collect())
}

pub fn read_information_model(reader: impl Read) -> anyhow::Result<Vec<InformationModelRow>> {
    normalize_model_rows(read_csv(reader)?)
}

fn normalize_model_rows(rows: Vec<InformationModelRow>) -> anyhow::Result<Vec<InformationModelRow>> {
    let mut out = Vec::with_capacity(rows.len());
    for (idx, mut row) in rows.into_iter().enumerate() {
        // header is line 1
        let line = idx + 2;
        for (field, value) in [
            ("AutomationDevice", &row.device),
            ("Machine", &row.machine),
            ("Station", &row.station),
        ] {
            if value.trim().is_empty() {
                bail!("line {}: empty {} column", line, field);
            }
        }
        if row.actuator.trim().is_empty() {
            // blank line inside the actuator block
            continue;
        }
        row.actuator = row.actuator.replace('_', "");
        out.push(row);
    }
    Ok(out)
}

fn read_csv_path<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let file = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_csv(file).with_context(|| format!("parse {}", path.display()))
}

fn read_csv<T: DeserializeOwned>(reader: impl Read) -> anyhow::Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut out = Vec::new();
    for (idx, rec) in rdr.deserialize().enumerate() {
        let rec: T = rec.with_context(|| format!("line {}", idx + 2))?;
        out.push(rec);
    }
    Ok(out)
}
