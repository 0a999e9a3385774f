use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node is detached from the document")]
    Detached,
    #[error("node is not an element")]
    NotAnElement,
    #[error("node is not a text node")]
    NotText,
    #[error("offset {offset} out of bounds (length {len})")]
    OffsetOutOfBounds { offset: usize, len: usize },
    #[error("insertion would detach the root or create a cycle")]
    InvalidInsertion,
}
