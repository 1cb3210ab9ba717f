//! XML documents consumed by the HMI runtime.
//!
//! Every writer emits an XML declaration and four-space indentation. Values
//! are escaped by quick-xml when pushed as attributes or text.

use crate::export::{TranslationItem, TypeTag};
use crate::model::{ModelTree, Node, NodeKind, ProtocolBlock};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

pub const INFO_MODEL_NS: &str = "http://www.ima.it/hmi/info-model";
pub const AUTOMATION_NS: &str = "http://www.ima.it/hmi/info-model/Automation";
pub const TAGS_NS: &str = "http://www.ima.it/hmi/info-model/tags";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

pub const PROJECT_TAGS_INCLUDE: &str = "Services/ProjectTags.xml";
const TAGS_FOLDER_DISPLAY_NAME: &str = "http://www.ima.it/hmi0/ui/translations/common>TagsType";
pub const TRANSLATION_LANGUAGE: &str = "en-US";

struct XmlDoc {
    writer: Writer<Vec<u8>>,
}

impl XmlDoc {
    fn new() -> anyhow::Result<Self> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        Ok(Self { writer })
    }

    fn open(&mut self, el: BytesStart<'_>) -> anyhow::Result<()> {
        self.writer.write_event(Event::Start(el))?;
        Ok(())
    }

    fn close(&mut self, name: &str) -> anyhow::Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn empty(&mut self, el: BytesStart<'_>) -> anyhow::Result<()> {
        self.writer.write_event(Event::Empty(el))?;
        Ok(())
    }

    fn text_element(&mut self, el: BytesStart<'_>, text: &str) -> anyhow::Result<()> {
        let name = String::from_utf8_lossy(el.name().as_ref()).into_owned();
        self.writer.write_event(Event::Start(el))?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.close(&name)
    }

    fn finish(self) -> anyhow::Result<String> {
        let mut out = String::from_utf8(self.writer.into_inner())?;
        out.push('\n');
        Ok(out)
    }
}

fn element<'a>(name: &'a str, attrs: &[(&str, &str)]) -> BytesStart<'a> {
    let mut el = BytesStart::new(name);
    for attr in attrs {
        el.push_attribute(*attr);
    }
    el
}

fn bool_attr(v: bool) -> &'static str {
    if v { "true" } else { "false" }
}

/// `MainInformationModel.xml`: tag include plus one `da:Application` holding
/// every automation device.
pub fn render_information_model(tree: &ModelTree) -> anyhow::Result<String> {
    let mut doc = XmlDoc::new()?;

    doc.open(element(
        "InformationModel",
        &[("xmlns", INFO_MODEL_NS), ("xmlns:da", AUTOMATION_NS), ("xmlns:xlink", XLINK_NS)],
    ))?;

    doc.open(element("TagsContainer", &[]))?;
    doc.empty(element(
        "Include",
        &[("file", PROJECT_TAGS_INCLUDE), ("ignoreIfMissing", "true")],
    ))?;
    doc.close("TagsContainer")?;

    doc.open(element("da:Application", &[("name", "Application")]))?;
    for device in &tree.devices {
        write_node(&mut doc, device)?;
    }
    doc.close("da:Application")?;

    doc.close("InformationModel")?;
    doc.finish()
}

fn write_node(doc: &mut XmlDoc, node: &Node) -> anyhow::Result<()> {
    let tag = if node.is_automation_element() {
        format!("da:{}", node.element_name())
    } else {
        node.element_name().to_string()
    };

    let mut el = BytesStart::new(tag.as_str());
    el.push_attribute(("name", node.name.as_str()));

    let hmi_id = node.hmi_id.map(|id| id.to_string());
    let mut endpoint: Option<BytesStart<'_>> = None;

    match &node.kind {
        NodeKind::AutomationDevice {
            shortcut,
            root_address,
        } => {
            el.push_attribute(("shortcut", shortcut.as_str()));
            el.push_attribute(("rootAddress", root_address.as_str()));
        }
        NodeKind::CommProtocol(p) => {
            el.push_attribute(("simulationEnable", bool_attr(p.simulation)));
            el.push_attribute(("disableVitalityCheck", bool_attr(!p.vitality_check)));
            match &p.block {
                ProtocolBlock::TwinCat {
                    endpoint: ep,
                    address,
                    port,
                    local_net_id,
                    remote_net_id,
                } => {
                    let port = port.to_string();
                    endpoint = Some(
                        element(
                            "TwinCat",
                            &[
                                ("name", ep.as_str()),
                                ("port", port.as_str()),
                                ("ipAddress", address.as_str()),
                                ("remoteAmsNetId", remote_net_id.as_str()),
                                ("localAmsNetId", local_net_id.as_str()),
                            ],
                        )
                        .into_owned(),
                    );
                }
                ProtocolBlock::OpcUa {
                    address,
                    port,
                    namespace_uri,
                    logging,
                } => {
                    el.push_attribute(("ipAddress", address.as_str()));
                    el.push_attribute(("port", port.to_string().as_str()));
                    el.push_attribute(("defaultNamespaceUri", namespace_uri.as_str()));
                    el.push_attribute(("logging", bool_attr(*logging)));
                }
                ProtocolBlock::EthernetIp {
                    endpoint: ep,
                    address,
                } => {
                    endpoint = Some(
                        element("EthernetIP", &[("name", ep.as_str()), ("ipAddress", address.as_str())])
                            .into_owned(),
                    );
                }
            }
        }
        NodeKind::Primitive(p) => {
            el.push_attribute(("dataType", p.data_type.as_str()));
            if let Some(plc) = &p.plc_tag {
                el.push_attribute(("plcTag", plc.as_str()));
            }
            if let Some(can_set) = &p.can_set {
                el.push_attribute(("canSet", can_set.as_str()));
            }
            if let Some(min) = &p.min_tag {
                el.push_attribute(("min", min.as_str()));
            }
            if let Some(max) = &p.max_tag {
                el.push_attribute(("max", max.as_str()));
            }
        }
        NodeKind::Alarm(a) => {
            el.push_attribute(("displayName", a.display_name.as_str()));
            el.push_attribute(("severity", a.severity.as_str()));
        }
        NodeKind::Machine
        | NodeKind::Station
        | NodeKind::Actuator { .. }
        | NodeKind::ShiftRegister
        | NodeKind::Wph
        | NodeKind::Nest
        | NodeKind::GenericOutbound
        | NodeKind::Folder => {}
    }

    if let Some(scope) = &node.scope_id {
        el.push_attribute(("scopeId", scope.as_str()));
    }
    if let Some(id) = &hmi_id {
        el.push_attribute(("hmiId", id.as_str()));
    }
    if let Some(tags) = &node.tags {
        el.push_attribute(("tags", tags.as_str()));
    }

    if node.children.is_empty() && endpoint.is_none() {
        return doc.empty(el);
    }

    doc.open(el)?;
    if let Some(ep) = endpoint {
        doc.empty(ep)?;
    }
    for child in &node.children {
        write_node(doc, child)?;
    }
    doc.close(&tag)
}

/// `ProjectTags.xml`: the `Type` folder of the type-tag catalog.
pub fn render_project_tags(catalog: &[TypeTag]) -> anyhow::Result<String> {
    let mut doc = XmlDoc::new()?;
    doc.open(element("TagsModel", &[("xmlns", INFO_MODEL_NS), ("xmlns:t", TAGS_NS)]))?;
    doc.open(element(
        "t:TagsFolder",
        &[("name", "Type"), ("displayName", TAGS_FOLDER_DISPLAY_NAME)],
    ))?;
    for tag in catalog {
        doc.empty(element("Tag", &[("name", tag.name.as_str()), ("displayName", tag.display_name.as_str())]))?;
    }
    doc.close("t:TagsFolder")?;
    doc.close("TagsModel")?;
    doc.finish()
}

/// `Alarms.xml`: the nodes produced by [`crate::export::alarm_list`].
pub fn render_alarm_list(alarms: &[Node]) -> anyhow::Result<String> {
    let mut doc = XmlDoc::new()?;
    doc.open(element("Alarms", &[("xmlns", INFO_MODEL_NS), ("xmlns:da", AUTOMATION_NS)]))?;
    for alarm in alarms {
        write_node(&mut doc, alarm)?;
    }
    doc.close("Alarms")?;
    doc.finish()
}

/// `en-US_Ima.Hmi.Module.Automation.Alarm.xml`.
pub fn render_alarm_translations(items: &[TranslationItem]) -> anyhow::Result<String> {
    let mut doc = XmlDoc::new()?;
    doc.open(element("Translations", &[]))?;
    doc.open(element("Translation", &[("language", TRANSLATION_LANGUAGE)]))?;
    for item in items {
        doc.text_element(element("Item", &[("textId", item.text_id.as_str())]), &item.text)?;
    }
    doc.close("Translation")?;
    doc.close("Translations")?;
    doc.finish()
}
