use thiserror::Error;

use vellum_dom::DomError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("no active selection")]
    NoSelection,
    #[error("range endpoint is not inside the document")]
    InvalidRange,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("unknown plugin: {0}")]
    UnknownPlugin(String),
    #[error("plugin is already registered: {0}")]
    DuplicatePlugin(String),
    #[error("node is not a component")]
    NotAComponent,
    #[error("editor is disabled")]
    Disabled,
    #[error("upload rejected")]
    UploadRejected,
    #[error("char limit exceeded: {limit}")]
    CharLimitExceeded { limit: usize },
    #[error(transparent)]
    Dom(#[from] DomError),
}
