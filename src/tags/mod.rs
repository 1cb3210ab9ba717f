//! Tag templates and their resolution per controller protocol.

pub mod resolve;
pub mod table;

pub use resolve::{ResolvedTag, TagContext, TagResolver};
pub use table::{Placeholder, TagTable, TagTableBuilder, TagTemplateEntry};
