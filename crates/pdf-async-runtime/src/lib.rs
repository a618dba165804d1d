mod handlers;
mod worker;

// Re-export types from the core crate
pub use pdf_fields::{
    ArtifactKind, EditorSession, ExtractionResult, PdfService, RequestKind, RequestToken,
    ServiceError, SignRequest, Upload, Workflow, WorkflowId,
};
pub use worker::worker_task;

/// Commands sent from the editor to the worker
#[derive(Debug)]
pub enum PdfCommand {
    Extract {
        token: RequestToken,
        file_name: String,
        pdf: Vec<u8>,
    },
    /// Flatten the custom fields into the document
    AddFields(Upload),
    CreateWorkflow(Upload),
    LoadWorkflow {
        token: RequestToken,
        id: WorkflowId,
    },
    /// Submit a signer's batch, then refetch the workflow
    Sign {
        token: RequestToken,
        id: WorkflowId,
        request: SignRequest,
    },
    Download {
        token: RequestToken,
        id: WorkflowId,
    },
}

impl PdfCommand {
    pub fn token(&self) -> RequestToken {
        match self {
            PdfCommand::AddFields(upload) | PdfCommand::CreateWorkflow(upload) => upload.token,
            PdfCommand::Extract { token, .. }
            | PdfCommand::LoadWorkflow { token, .. }
            | PdfCommand::Sign { token, .. }
            | PdfCommand::Download { token, .. } => *token,
        }
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            PdfCommand::Extract { .. } => RequestKind::Extract,
            PdfCommand::AddFields(_) => RequestKind::AddFields,
            PdfCommand::CreateWorkflow(_) => RequestKind::CreateWorkflow,
            PdfCommand::LoadWorkflow { .. } => RequestKind::LoadWorkflow,
            PdfCommand::Sign { .. } => RequestKind::Sign,
            PdfCommand::Download { .. } => RequestKind::Download,
        }
    }
}

/// Updates sent from the worker back to the editor
#[derive(Debug, Clone)]
pub enum PdfUpdate {
    Extracted {
        token: RequestToken,
        result: ExtractionResult,
    },
    FieldsAdded {
        token: RequestToken,
        pdf: Vec<u8>,
    },
    /// A workflow was created, fetched, or refetched after signing
    WorkflowLoaded {
        token: RequestToken,
        workflow: Workflow,
    },
    Downloaded {
        token: RequestToken,
        pdf: Vec<u8>,
    },
    Failed {
        token: RequestToken,
        kind: RequestKind,
        error: ServiceError,
    },
}

impl PdfUpdate {
    pub fn token(&self) -> RequestToken {
        match self {
            PdfUpdate::Extracted { token, .. }
            | PdfUpdate::FieldsAdded { token, .. }
            | PdfUpdate::WorkflowLoaded { token, .. }
            | PdfUpdate::Downloaded { token, .. }
            | PdfUpdate::Failed { token, .. } => *token,
        }
    }
}

/// Fold a worker update into the editor session.
///
/// Returns `false` when the session discarded it as stale.
pub fn apply_update(session: &mut EditorSession, update: PdfUpdate) -> bool {
    match update {
        PdfUpdate::Extracted { token, result } => session.apply_extraction(token, result),
        PdfUpdate::FieldsAdded { token, pdf } => {
            session.store_artifact(token, ArtifactKind::Generated, pdf)
        }
        PdfUpdate::WorkflowLoaded { token, workflow } => session.apply_workflow(token, workflow),
        PdfUpdate::Downloaded { token, pdf } => {
            session.store_artifact(token, ArtifactKind::Signed, pdf)
        }
        PdfUpdate::Failed { token, kind, error } => {
            session.record_failure(token, kind, error.to_string())
        }
    }
}
