//! Tag template table: symbolic key -> per-protocol (data type, address format).
//!
//! Address formats use `{Placeholder}` tokens, e.g.
//! `MAIN_PRG._{Machine_Number}_{Station_Number}_{Station_Name}.PackML.Sts_State`.
//! Formats are parsed into segments when the table is built, so an unknown
//! placeholder is a load error rather than a resolution error.

use crate::device::ProtocolFamily;
use crate::error::TableError;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Placeholder {
    MachineNumber,
    StationNumber,
    StationName,
    ActuatorNumber,
    ActuatorName,
    WphNumber,
    NestNumber,
    ParameterName,
}

impl Placeholder {
    pub const ALL: [Placeholder; 8] = [
        Placeholder::MachineNumber,
        Placeholder::StationNumber,
        Placeholder::StationName,
        Placeholder::ActuatorNumber,
        Placeholder::ActuatorName,
        Placeholder::WphNumber,
        Placeholder::NestNumber,
        Placeholder::ParameterName,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Placeholder::MachineNumber => "Machine_Number",
            Placeholder::StationNumber => "Station_Number",
            Placeholder::StationName => "Station_Name",
            Placeholder::ActuatorNumber => "Actuator_Number",
            Placeholder::ActuatorName => "Actuator_Name",
            Placeholder::WphNumber => "Wph_Number",
            Placeholder::NestNumber => "Nest_Number",
            Placeholder::ParameterName => "Parameter_Name",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// Parsed address format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFormat {
    pub source: String,
    pub segments: Vec<Segment>,
}

impl AddressFormat {
    /// Split `source` into literals and placeholders.
    ///
    /// Returns the offending name on an unknown placeholder.
    fn parse(source: &str, re: &Regex) -> Result<Self, String> {
        let mut segments = Vec::new();
        let mut last = 0;
        for caps in re.captures_iter(source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(source[last..whole.start()].to_string()));
            }
            let p = Placeholder::from_name(name.as_str()).ok_or_else(|| name.as_str().to_string())?;
            segments.push(Segment::Placeholder(p));
            last = whole.end();
        }
        if last < source.len() {
            segments.push(Segment::Literal(source[last..].to_string()));
        }
        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(p) => Some(*p),
            Segment::Literal(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFormat {
    pub data_type: String,
    pub format: AddressFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTemplateEntry {
    pub formats: BTreeMap<ProtocolFamily, TagFormat>,
}

#[derive(Debug, Clone, Default)]
pub struct TagTable {
    entries: BTreeMap<String, TagTemplateEntry>,
}

const PLACEHOLDER_RE: &str = r"\{([A-Za-z_]+)\}";

/// Collects rows and validates formats before producing a `TagTable`.
pub struct TagTableBuilder {
    re: Regex,
    entries: BTreeMap<String, TagTemplateEntry>,
}

impl TagTableBuilder {
    pub fn new() -> Result<Self, TableError> {
        let re = Regex::new(PLACEHOLDER_RE).map_err(|e| TableError::InvalidRow {
            row: 0,
            message: e.to_string(),
        })?;
        Ok(Self {
            re,
            entries: BTreeMap::new(),
        })
    }

    pub fn insert(
        &mut self,
        key: &str,
        family: ProtocolFamily,
        data_type: &str,
        format: &str,
    ) -> Result<&mut Self, TableError> {
        let format =
            AddressFormat::parse(format, &self.re).map_err(|placeholder| {
                TableError::UnknownPlaceholder {
                    key: key.to_string(),
                    family,
                    placeholder,
                }
            })?;
        self.entries.entry(key.to_string()).or_default().formats.insert(
            family,
            TagFormat {
                data_type: data_type.to_string(),
                format,
            },
        );
        Ok(self)
    }

    pub fn build(self) -> TagTable {
        TagTable {
            entries: self.entries,
        }
    }
}

impl TagTable {
    pub fn get(&self, key: &str) -> Option<&TagTemplateEntry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &TagTemplateEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The table shipped with the generator: Beckhoff and OPC-UA share the
    /// TwinCAT symbol paths, Rockwell uses program-scoped tags.
    pub fn builtin() -> Result<Self, TableError> {
        let mut b = TagTableBuilder::new()?;

        const TWINCAT_STATION: &str = "MAIN_PRG._{Machine_Number}_{Station_Number}_{Station_Name}";
        const TWINCAT_MACHINE: &str = "MAIN_PRG._{Machine_Number}_Main";
        const TWINCAT_LOOP: &str = "M{Machine_Number}.GVLWPHsLoop01[{Wph_Number}]";
        const ROCKWELL_STATION: &str = "Program:M{Machine_Number}.ST{Station_Number}_{Station_Name}";
        const ROCKWELL_MACHINE: &str = "Program:M{Machine_Number}.Main";
        const ROCKWELL_LOOP: &str = "M{Machine_Number}_WPHsLoop01[{Wph_Number}]";

        let layouts = [
            (ProtocolFamily::Beckhoff, TWINCAT_STATION, TWINCAT_MACHINE, TWINCAT_LOOP),
            (ProtocolFamily::OpcUa, TWINCAT_STATION, TWINCAT_MACHINE, TWINCAT_LOOP),
            (ProtocolFamily::Rockwell, ROCKWELL_STATION, ROCKWELL_MACHINE, ROCKWELL_LOOP),
        ];

        let nest_fields = [
            ("Sts_Enable", "Boolean", "Sts_Enable"),
            ("Sts_Bad", "Boolean", "Sts_Bad"),
            ("Sts_Full", "Boolean", "Sts_Full"),
            ("Sts_Good", "Boolean", "Sts_Good"),
            ("RejectCode", "Int32", "Sts_SpecFailCode"),
            ("StationReject", "Int32", "Sts_StationFailID"),
        ];

        for (family, station, machine, lane) in layouts {
            let station_wph = format!("{station}.WPHs.WPH[{{Wph_Number}}]");
            b.insert("Machine_PackMl_State", family, "Int32", &format!("{machine}.PackML.Sts_State"))?
                .insert("Machine_PackMl_Mode", family, "Int32", &format!("{machine}.PackML.Sts_Mode"))?
                .insert("Station_PackMl_State", family, "Int32", &format!("{station}.PackML.Sts_State"))?
                .insert("station_node", family, "Struct", station)?
                .insert(
                    "actuator_node",
                    family,
                    "Struct",
                    &format!("{station}._{{Actuator_Number}}_{{Actuator_Name}}"),
                )?
                .insert("parameter_node", family, "Int32", &format!("{station}.Pars.{{Parameter_Name}}"))?
                .insert("alarm_machine_group", family, "Int32", machine)?
                .insert("alarm_station_group", family, "Int32", station)?
                .insert(
                    "shift_register_Station_StationID",
                    family,
                    "Int64",
                    &format!("{station}.WPHs.Sts_StationID"),
                )?
                .insert(
                    "shift_register_Station_WPHID",
                    family,
                    "Int32",
                    &format!("{station_wph}.Sts_MoverID"),
                )?
                .insert("shift_register_Loop_WPHID", family, "Int32", &format!("{lane}.Sts_MoverID"))?;

            for (name, data_type, field) in nest_fields {
                b.insert(
                    &format!("shift_register_Station_Nest_{name}"),
                    family,
                    data_type,
                    &format!("{station_wph}.Nest[{{Nest_Number}}].{field}"),
                )?
                .insert(
                    &format!("shift_register_Loop_Nest_{name}"),
                    family,
                    data_type,
                    &format!("{lane}.Nest[{{Nest_Number}}].{field}"),
                )?;
            }
        }

        Ok(b.build())
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .from_path(path)?;
        Self::from_csv(rdr)
    }

    pub fn from_csv_reader(reader: impl Read) -> Result<Self, TableError> {
        let rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .from_reader(reader);
        Self::from_csv(rdr)
    }

    /// Header: `Key;<Family> Type;<Family> Format;...`. Empty format cells mean
    /// the key has no address for that family.
    fn from_csv<R: Read>(mut rdr: csv::Reader<R>) -> Result<Self, TableError> {
        let headers = rdr.headers()?.clone();

        let mut columns: BTreeMap<ProtocolFamily, (Option<usize>, Option<usize>)> = BTreeMap::new();
        for (idx, h) in headers.iter().enumerate() {
            let h = h.trim();
            if let Some(fam) = h.strip_suffix(" Type").and_then(ProtocolFamily::from_column_name) {
                columns.entry(fam).or_default().0 = Some(idx);
            } else if let Some(fam) = h.strip_suffix(" Format").and_then(ProtocolFamily::from_column_name) {
                columns.entry(fam).or_default().1 = Some(idx);
            }
        }

        let mut b = TagTableBuilder::new()?;
        let mut seen = std::collections::BTreeSet::new();

        for (idx, record) in rdr.records().enumerate() {
            let record = record?;
            // header is line 1
            let row = idx + 2;
            let key = record.get(0).map(str::trim).unwrap_or_default();
            if key.is_empty() {
                continue;
            }
            if !seen.insert(key.to_string()) {
                return Err(TableError::DuplicateKey(key.to_string()));
            }

            for (family, cols) in &columns {
                let (Some(type_col), Some(format_col)) = *cols else {
                    return Err(TableError::InvalidRow {
                        row,
                        message: format!("{family} needs both a Type and a Format column"),
                    });
                };
                let format = record.get(format_col).map(str::trim).unwrap_or_default();
                if format.is_empty() {
                    continue;
                }
                let data_type = record.get(type_col).map(str::trim).unwrap_or_default();
                if data_type.is_empty() {
                    return Err(TableError::InvalidRow {
                        row,
                        message: format!("'{key}' has a {family} format but no type"),
                    });
                }
                b.insert(key, *family, data_type, format)?;
            }
        }

        Ok(b.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_literals_and_placeholders() {
        let re = Regex::new(PLACEHOLDER_RE).unwrap();
        let f = AddressFormat::parse("MAIN_PRG._{Machine_Number}_Main.L", &re).unwrap();
        assert_eq!(
            f.segments,
            vec![
                Segment::Literal("MAIN_PRG._".into()),
                Segment::Placeholder(Placeholder::MachineNumber),
                Segment::Literal("_Main.L".into()),
            ]
        );
    }

    #[test]
    fn rejects_unknown_placeholder() {
        let mut b = TagTableBuilder::new().unwrap();
        let err = b
            .insert("k", ProtocolFamily::OpcUa, "Int32", "X.{Line_Number}")
            .err()
            .unwrap();
        assert!(matches!(err, TableError::UnknownPlaceholder { placeholder, .. } if placeholder == "Line_Number"));
    }

    #[test]
    fn builtin_covers_implemented_families() {
        let table = TagTable::builtin().unwrap();
        for (key, entry) in table.entries() {
            for family in [ProtocolFamily::Beckhoff, ProtocolFamily::OpcUa, ProtocolFamily::Rockwell] {
                assert!(entry.formats.contains_key(&family), "{key} missing {family}");
            }
            assert!(!entry.formats.contains_key(&ProtocolFamily::Siemens));
        }
        assert!(table.get("shift_register_Loop_Nest_StationReject").is_some());
    }

    #[test]
    fn loads_semicolon_csv() {
        let csv = "Key;Beckhoff Type;Beckhoff Format;OpcUa Type;OpcUa Format\n\
                   station_node;Struct;MAIN_PRG._{Machine_Number}_{Station_Number};;\n\
                   Machine_PackMl_State;Int32;MAIN_PRG._{Machine_Number}_Main.State;Int32;ns.{Machine_Number}\n";
        let table = TagTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        let station = table.get("station_node").unwrap();
        assert!(station.formats.contains_key(&ProtocolFamily::Beckhoff));
        assert!(!station.formats.contains_key(&ProtocolFamily::OpcUa));
        let state = table.get("Machine_PackMl_State").unwrap();
        assert_eq!(state.formats[&ProtocolFamily::OpcUa].format.source, "ns.{Machine_Number}");
    }

    #[test]
    fn csv_rejects_duplicate_keys() {
        let csv = "Key;OpcUa Type;OpcUa Format\nk;Int32;a\nk;Int32;b\n";
        assert!(matches!(
            TagTable::from_csv_reader(csv.as_bytes()),
            Err(TableError::DuplicateKey(k)) if k == "k"
        ));
    }
}
