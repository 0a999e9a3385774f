mod command;
mod controller;
mod error;
mod event;
mod format;
mod history;
mod mutation;
mod options;
mod plugin;
mod selection;
mod session;
mod upload;

pub use crate::command::{Command, CommandDisplay};
pub use crate::controller::ControllerState;
pub use crate::error::EditorError;
pub use crate::event::Event;
pub use crate::mutation::{Detached, DetachedEdges, MergedOffsets, RemovedRange};
pub use crate::options::{CharCounterType, EditorOptions};
pub use crate::plugin::{EditorPlugin, PluginCapabilities, PluginRegistry};
pub use crate::selection::Range;
pub use crate::session::EditorSession;
pub use crate::upload::{PendingUpload, UploadInfo};

pub use vellum_dom::{tag, DocumentTree, DomError, Element, NodeId, NodeKind, Whitelist};
