use super::{DeviceScope, TreeBuilder, plc_ref};
use crate::error::BuildError;
use crate::ids::IdAllocator;
use crate::input::InformationModelRow;
use crate::model::{Node, NodeKind, Primitive};
use crate::tags::TagContext;

/// Signals tracked per nest, in document order. Each name is also the tag key suffix.
pub const NEST_SIGNALS: [&str; 6] = [
    "Sts_Enable",
    "Sts_Bad",
    "Sts_Full",
    "Sts_Good",
    "RejectCode",
    "StationReject",
];

/// Which tag family fills the register: one station's lanes or the machine loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterScope {
    Station,
    Line,
}

impl RegisterScope {
    fn key_prefix(self) -> &'static str {
        match self {
            RegisterScope::Station => "shift_register_Station",
            RegisterScope::Line => "shift_register_Loop",
        }
    }
}

impl TreeBuilder<'_> {
    /// Register -> `wph_count` holders -> `nest_count` nests -> six signals.
    ///
    /// Station registers also carry the `StationId` primitive.
    #[allow(clippy::too_many_arguments)]
    pub fn build_shift_register(
        &self,
        dev: DeviceScope<'_>,
        name: &str,
        row: &InformationModelRow,
        wph_count: u32,
        nest_count: u32,
        scope: RegisterScope,
        ids: &mut IdAllocator,
    ) -> Result<Node, BuildError> {
        let prefix = scope.key_prefix();

        let mut register = Node::new(NodeKind::ShiftRegister, name)
            .with_scope(name)
            .with_id(ids.next())
            .with_tags("Type/ShiftRegister");

        if scope == RegisterScope::Station {
            let tag = self.resolve(&format!("{prefix}_StationID"), dev, row)?;
            register.push(Node::primitive(
                "StationId",
                Primitive::tagged(tag.data_type, plc_ref(&tag.address)),
            ));
        }

        let base = TagContext::from_row(row);
        for wph in 1..=wph_count {
            let ctx = base.with_wph(Some(wph));
            let wph_name = format!("WPH_{wph}");
            let mut holder = Node::new(NodeKind::Wph, &wph_name)
                .with_scope(&wph_name)
                .with_id(ids.next());

            let tag = self.resolve_in(&format!("{prefix}_WPHID"), dev, &ctx)?;
            holder.push(Node::primitive(
                "WphId",
                Primitive::tagged(tag.data_type, plc_ref(&tag.address)),
            ));

            for nest in 1..=nest_count {
                let ctx = ctx.with_nest(Some(nest));
                let nest_name = nest.to_string();
                let mut nest_node = Node::new(NodeKind::Nest, &nest_name)
                    .with_scope(&nest_name)
                    .with_id(ids.next());

                for signal in NEST_SIGNALS {
                    let tag = self.resolve_in(&format!("{prefix}_Nest_{signal}"), dev, &ctx)?;
                    nest_node.push(Node::primitive(
                        signal,
                        Primitive::tagged(tag.data_type, plc_ref(&tag.address)),
                    ));
                }
                holder.push(nest_node);
            }
            register.push(holder);
        }

        Ok(register)
    }
}
