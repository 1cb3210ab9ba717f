use super::display_name;
use crate::ids::HmiId;
use crate::input::AlarmRecord;
use crate::model::{AlarmEntry, Node, NodeKind};
use serde::Serialize;

pub const ALARM_SEVERITY: &str = "Alarm";

/// One `Alarm` node per record, numbered from 1 in input order.
///
/// The list has its own numbering space, independent of the model's ids.
pub fn alarm_list(alarms: &[AlarmRecord]) -> Vec<Node> {
    alarms
        .iter()
        .zip(1u32..)
        .map(|(alarm, nr)| {
            Node::new(
                NodeKind::Alarm(AlarmEntry {
                    display_name: display_name(&alarm.name),
                    severity: ALARM_SEVERITY.to_string(),
                }),
                &alarm.input,
            )
            .with_scope(nr.to_string())
            .with_id(HmiId(nr))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationItem {
    pub text_id: String,
    pub text: String,
}

pub fn alarm_translations(alarms: &[AlarmRecord]) -> Vec<TranslationItem> {
    alarms
        .iter()
        .map(|a| TranslationItem {
            text_id: a.name.clone(),
            text: a.message.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn alarm(name: &str, input: &str, message: &str) -> AlarmRecord {
        AlarmRecord {
            device: "PLC1".into(),
            name: name.into(),
            input: input.into(),
            acknowledge: String::new(),
            message: message.into(),
        }
    }

    #[test]
    fn list_numbers_from_one() {
        let alarms = [
            alarm("Alarm_5", "_11_00_Alms.L2.0", "Door open"),
            alarm("Alarm_6", "_11_02_Alms.L1.3", "Jam"),
        ];
        let list = alarm_list(&alarms);

        assert_eq!(list.len(), 2);
        assert_eq!(list[1].name, "_11_02_Alms.L1.3");
        assert_eq!(list[1].scope_id.as_deref(), Some("2"));
        assert_eq!(list[1].hmi_id, Some(HmiId(2)));
        match &list[0].kind {
            NodeKind::Alarm(entry) => {
                assert_eq!(entry.display_name, "Ima.Hmi.Module.Automation>Alarm_5");
                assert_eq!(entry.severity, "Alarm");
            }
            other => panic!("unexpected kind {other:?}"),
        }

        assert_eq!(
            alarm_translations(&alarms)[1],
            TranslationItem {
                text_id: "Alarm_6".into(),
                text: "Jam".into(),
            }
        );
    }
}
