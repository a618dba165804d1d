//! Editor state container
//!
//! [`EditorSession`] owns everything derived from the current document: the
//! extraction result, page geometry, custom fields, the move gesture, the
//! workflow and the downloaded artifacts. Every service request is tagged with
//! the [`RequestToken`] of the document it was issued for; a response carrying
//! an older token is discarded so a superseded upload can never write into the
//! current document.

use std::collections::HashMap;
use std::fmt;

use crate::field::{ExtractedField, Field, FieldId};
use crate::geometry::PageGeometry;
use crate::model::FieldModel;
use crate::placement::{self, PlacementController};
use crate::service::{ExtractionResult, FieldRequest, ensure_pdf};
use crate::signer::SignerSession;
use crate::transform::{self, ViewportPoint, ViewportRect};
use crate::types::*;
use crate::workflow::Workflow;

/// Identifies the document context a request was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(pub u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Service operations, used to route failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Extract,
    AddFields,
    CreateWorkflow,
    LoadWorkflow,
    Sign,
    Download,
}

/// Kinds of generated documents. At most one live artifact per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Output of the flatten operation
    Generated,
    /// Final document of a completed workflow
    Signed,
}

impl ArtifactKind {
    pub fn default_file_name(self) -> &'static str {
        match self {
            ArtifactKind::Generated => "generated.pdf",
            ArtifactKind::Signed => "signed.pdf",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub data: Vec<u8>,
}

/// A request ready to be handed to the service
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub token: RequestToken,
    pub file_name: String,
    pub pdf: Vec<u8>,
    pub fields: Vec<FieldRequest>,
}

/// Which field an overlay belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlaySource {
    /// Index into the extracted fields
    Extracted(usize),
    Custom(FieldId),
}

/// A field positioned over a displayed page
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub source: OverlaySource,
    pub name: String,
    pub field_type: FieldType,
    pub rect: ViewportRect,
    pub assigned_to: Option<SignerRole>,
}

#[derive(Debug, Clone)]
struct SourceDocument {
    file_name: String,
    pdf: Vec<u8>,
}

#[derive(Debug)]
pub struct EditorSession {
    status: SessionStatus,
    token: RequestToken,
    source: Option<SourceDocument>,
    extraction: Option<ExtractionResult>,
    geometry: PageGeometry,
    model: FieldModel,
    controller: PlacementController,
    workflow: Option<Workflow>,
    artifacts: HashMap<ArtifactKind, Artifact>,
    last_error: Option<String>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(transform::DEFAULT_RENDER_DPI)
    }
}

impl EditorSession {
    pub fn new(render_dpi: f32) -> Self {
        Self {
            status: SessionStatus::Idle,
            token: RequestToken(0),
            source: None,
            extraction: None,
            geometry: PageGeometry::new(render_dpi),
            model: FieldModel::new(),
            controller: PlacementController::new(),
            workflow: None,
            artifacts: HashMap::new(),
            last_error: None,
        }
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn file_name(&self) -> Option<&str> {
        self.source.as_ref().map(|s| s.file_name.as_str())
    }

    pub fn extraction(&self) -> Option<&ExtractionResult> {
        self.extraction.as_ref()
    }

    pub fn extracted_fields(&self) -> &[ExtractedField] {
        self.extraction
            .as_ref()
            .map(|e| e.fields.as_slice())
            .unwrap_or_default()
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn model(&self) -> &FieldModel {
        &self.model
    }

    pub fn controller(&self) -> &PlacementController {
        &self.controller
    }

    pub fn workflow(&self) -> Option<&Workflow> {
        self.workflow.as_ref()
    }

    pub fn artifact(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.artifacts.get(&kind)
    }

    /// Message of the last failed non-extraction request
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn is_current(&self, token: RequestToken, what: &str) -> bool {
        if token == self.token {
            true
        } else {
            log::debug!(
                "Discarding stale {} response {} (current {})",
                what,
                token,
                self.token
            );
            false
        }
    }

    /// Start loading a new document.
    ///
    /// Non-PDF input is rejected before anything else changes. Otherwise every
    /// piece of derived state is reset and the token of the new document
    /// context is returned.
    pub fn begin_upload(&mut self, file_name: &str, pdf: Vec<u8>) -> Result<RequestToken> {
        if let Err(e) = ensure_pdf(file_name, &pdf) {
            self.status = SessionStatus::Failed(e.to_string());
            return Err(e.into());
        }

        self.token = RequestToken(self.token.0 + 1);
        self.extraction = None;
        self.geometry.clear();
        self.model.clear();
        self.controller.reset();
        self.workflow = None;
        self.release_artifacts();
        self.last_error = None;
        self.source = Some(SourceDocument {
            file_name: file_name.to_string(),
            pdf,
        });
        self.status = SessionStatus::Loading;
        log::info!("Uploading {} as document {}", file_name, self.token);
        Ok(self.token)
    }

    pub fn apply_extraction(&mut self, token: RequestToken, result: ExtractionResult) -> bool {
        if !self.is_current(token, "extraction") {
            return false;
        }
        log::info!(
            "Extracted {} fields and {} pages from {}",
            result.total_fields,
            result.pages.len(),
            result.file_name
        );
        self.geometry.set_pages(&result.pages);
        self.extraction = Some(result);
        self.status = SessionStatus::Ready;
        true
    }

    /// Record a failed request. A failed extraction leaves the session failed
    /// with no field or page data; any other failure leaves state untouched and
    /// only keeps the message.
    pub fn record_failure(
        &mut self,
        token: RequestToken,
        kind: RequestKind,
        message: String,
    ) -> bool {
        if !self.is_current(token, "failure") {
            return false;
        }
        log::warn!("{:?} failed: {}", kind, message);
        if kind == RequestKind::Extract {
            self.extraction = None;
            self.geometry.clear();
            self.status = SessionStatus::Failed(message);
        } else {
            self.last_error = Some(message);
        }
        true
    }

    /// A page image was laid out (loaded or resized) at `rendered_width` pixels.
    pub fn image_loaded(&mut self, page: usize, rendered_width: f32) -> Option<f32> {
        self.geometry.image_loaded(page, rendered_width)
    }

    /// Palette drop of a field-type `token` on `page`
    pub fn drop_field(
        &mut self,
        token: Option<&str>,
        page: usize,
        at: ViewportPoint,
    ) -> Option<FieldId> {
        let extraction = self.extraction.as_ref()?;
        if page >= extraction.pages.len() {
            return None;
        }
        placement::drop_field(
            &mut self.model,
            &self.geometry,
            &extraction.fields,
            token,
            page,
            at,
        )
    }

    pub fn pointer_down(&mut self, id: FieldId, at: ViewportPoint) -> bool {
        self.controller.pointer_down(&self.model, id, at)
    }

    pub fn pointer_move(&mut self, at: ViewportPoint) -> bool {
        self.controller
            .pointer_move(&mut self.model, &self.geometry, at)
    }

    pub fn pointer_up(&mut self) -> Option<FieldId> {
        self.controller.pointer_up()
    }

    pub fn rename_field(&mut self, id: FieldId, name: &str) -> bool {
        self.model.rename(id, name)
    }

    pub fn set_field_value(&mut self, id: FieldId, value: Option<String>) -> bool {
        self.model.set_value(id, value)
    }

    pub fn reassign_field(&mut self, id: FieldId, signer: SignerRole) -> bool {
        self.model.reassign(id, signer)
    }

    pub fn remove_field(&mut self, id: FieldId) -> bool {
        self.controller.cancel_if(id);
        self.model.remove(id)
    }

    /// Overlays for `page`. Empty until the page has been measured.
    pub fn overlays(&self, page: usize) -> Vec<Overlay> {
        let Some(scale) = self.geometry.scale(page) else {
            return Vec::new();
        };
        let extracted = self
            .extracted_fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| f.page() == page)
            .map(|(index, f)| Overlay {
                source: OverlaySource::Extracted(index),
                name: f.name().to_string(),
                field_type: f.field_type(),
                rect: transform::to_viewport(&f.rect(), f.page_height(), scale),
                assigned_to: None,
            });
        let custom = self.model.on_page(page).map(|f| Overlay {
            source: OverlaySource::Custom(f.id()),
            name: f.name().to_string(),
            field_type: f.field_type(),
            rect: transform::to_viewport(&f.rect(), f.page_height(), scale),
            assigned_to: Some(f.assigned_to()),
        });
        extracted.chain(custom).collect()
    }

    fn source(&self) -> Result<&SourceDocument> {
        self.source.as_ref().ok_or(FieldsError::NoDocument)
    }

    /// Build the flatten request for the current fields
    pub fn prepare_flatten(&self) -> Result<Upload> {
        let source = self.source()?;
        Ok(Upload {
            token: self.token,
            file_name: source.file_name.clone(),
            pdf: source.pdf.clone(),
            fields: self.model.flatten_requests(),
        })
    }

    /// Build the create-workflow request from a snapshot of the current fields
    pub fn prepare_workflow(&self) -> Result<Upload> {
        let source = self.source()?;
        if self.workflow.is_some() {
            return Err(FieldsError::WorkflowAlreadyCreated);
        }
        Ok(Upload {
            token: self.token,
            file_name: source.file_name.clone(),
            pdf: source.pdf.clone(),
            fields: self.model.workflow_requests()?,
        })
    }

    /// Install a created or refetched workflow.
    ///
    /// A refetch must keep the bound id and the frozen fields, and its status
    /// may only move forward.
    pub fn apply_workflow(&mut self, token: RequestToken, workflow: Workflow) -> bool {
        if !self.is_current(token, "workflow") {
            return false;
        }
        if let Some(current) = &self.workflow {
            if current.id() != workflow.id() {
                log::warn!(
                    "Ignoring workflow {}: document is bound to workflow {}",
                    workflow.id(),
                    current.id()
                );
                return false;
            }
            if workflow.status() < current.status() {
                log::warn!(
                    "Ignoring workflow {} at {}: already {}",
                    workflow.id(),
                    workflow.status(),
                    current.status()
                );
                return false;
            }
            if !current.same_snapshot(&workflow) {
                log::warn!("Ignoring workflow {}: its fields changed", workflow.id());
                return false;
            }
        }
        log::info!("Workflow {} is {}", workflow.id(), workflow.status());
        self.workflow = Some(workflow);
        self.last_error = None;
        true
    }

    /// Open the signing view for `signer` over the current workflow
    pub fn open_signer(&self, signer: SignerRole) -> Result<SignerSession> {
        let workflow = self.workflow.as_ref().ok_or(FieldsError::NoWorkflow)?;
        SignerSession::open(workflow, signer)
    }

    /// Keep a downloaded document, releasing the previous one of the same kind.
    pub fn store_artifact(
        &mut self,
        token: RequestToken,
        kind: ArtifactKind,
        data: Vec<u8>,
    ) -> bool {
        if !self.is_current(token, "artifact") {
            return false;
        }
        if let Some(previous) = self.artifacts.insert(kind, Artifact { kind, data }) {
            log::debug!("Released previous {:?} artifact ({} bytes)", kind, previous.data.len());
        }
        true
    }

    fn release_artifacts(&mut self) {
        for (kind, artifact) in self.artifacts.drain() {
            log::debug!("Released {:?} artifact ({} bytes)", kind, artifact.data.len());
        }
    }
}
