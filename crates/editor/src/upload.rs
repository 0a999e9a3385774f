use serde::{Deserialize, Serialize};
use tracing::debug;

use vellum_dom::{Element, NodeId};

use crate::error::EditorError;
use crate::session::EditorSession;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadInfo {
    pub plugin: String,
    pub file_name: String,
    pub size: u64,
}

/// Token for an upload running outside the engine. The engine's only side
/// effect happens at [`EditorSession::complete_upload`]; dropping the token
/// aborts the upload with nothing to roll back.
#[derive(Debug)]
pub struct PendingUpload {
    pub(crate) id: u64,
    pub info: UploadInfo,
}

impl EditorSession {
    /// Asks the upload gate for permission and hands out a re-entry token.
    pub fn request_upload(&mut self, info: UploadInfo) -> Result<PendingUpload, EditorError> {
        if !self.is_enabled() {
            return Err(EditorError::Disabled);
        }
        if let Some(gate) = &self.upload_gate {
            if !gate(&info) {
                debug!(file = %info.file_name, "upload rejected by gate");
                return Err(EditorError::UploadRejected);
            }
        }
        self.upload_seq += 1;
        debug!(id = self.upload_seq, file = %info.file_name, "upload started");
        Ok(PendingUpload {
            id: self.upload_seq,
            info,
        })
    }

    /// Re-enters the mutation engine with the finished upload as a fresh
    /// top-level component insertion. Returns the inserted component node.
    pub fn complete_upload(
        &mut self,
        upload: PendingUpload,
        element: Element,
    ) -> Result<NodeId, EditorError> {
        let node = self.tree.create_element(element);
        self.insert_component(node, false)?;
        debug!(id = upload.id, "upload completed");
        Ok(node)
    }
}
