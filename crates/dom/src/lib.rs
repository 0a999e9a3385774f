mod element;
mod error;
mod html;
pub mod tag;
mod tree;
mod whitelist;

pub use crate::element::Element;
pub use crate::error::DomError;
pub use crate::html::{clean, parse_fragment, serialize_children, serialize_node};
pub use crate::tree::{DocumentTree, NodeId, NodeKind};
pub use crate::whitelist::Whitelist;
