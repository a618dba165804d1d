use std::io::Read;
use std::time::Duration;

use pdf_fields::{
    ExtractionResult, FieldRequest, PdfService, ServiceError, SignRequest, Workflow, WorkflowId,
};

use crate::config::ServiceConfig;
use crate::multipart::MultipartForm;
use crate::wire::{WireExtraction, WireWorkflow};

const PDF_MIME: &str = "application/pdf";

/// [`PdfService`] over the HTTP API of the reference backend
#[derive(Debug, Clone)]
pub struct HttpPdfService {
    agent: ureq::Agent,
    base_url: String,
    render_dpi: f32,
}

impl HttpPdfService {
    pub fn new(config: &ServiceConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            agent,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            render_dpi: config.render_dpi,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn post_form(
        &self,
        path: &str,
        form: MultipartForm,
    ) -> Result<ureq::Response, ServiceError> {
        let url = self.endpoint(path);
        let (content_type, body) = form.finish();
        log::debug!("POST {} ({} bytes)", url, body.len());
        self.agent
            .post(&url)
            .set("Content-Type", &content_type)
            .send_bytes(&body)
            .map_err(classify)
    }

    fn get(&self, path: &str) -> Result<ureq::Response, ServiceError> {
        let url = self.endpoint(path);
        log::debug!("GET {}", url);
        self.agent.get(&url).call().map_err(classify)
    }
}

/// Form with the uploaded document and the JSON-encoded field list
fn upload_form(
    file_name: &str,
    pdf: &[u8],
    fields: &[FieldRequest],
) -> Result<MultipartForm, ServiceError> {
    let fields_json = serde_json::to_string(fields)
        .map_err(|e| ServiceError::Unknown(format!("Failed to encode fields: {}", e)))?;
    Ok(MultipartForm::new()
        .file("file", file_name, PDF_MIME, pdf)
        .text("fields", &fields_json))
}

/// Map a ureq failure to the service error kinds.
///
/// Any answered request with a non-success status is a transport error;
/// failures without a status (DNS, refused connection, timeout) are unknown.
pub fn classify(error: ureq::Error) -> ServiceError {
    match error {
        ureq::Error::Status(status, response) => {
            let reason = response.status_text().to_string();
            let body = response.into_string().unwrap_or_default();
            let message = if body.trim().is_empty() {
                reason
            } else {
                body.trim().to_string()
            };
            ServiceError::Transport { status, message }
        }
        ureq::Error::Transport(transport) => ServiceError::Unknown(transport.to_string()),
    }
}

fn read_bytes(response: ureq::Response) -> Result<Vec<u8>, ServiceError> {
    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| ServiceError::Unknown(format!("Failed to read response: {}", e)))?;
    Ok(bytes)
}

fn read_workflow(response: ureq::Response) -> Result<Workflow, ServiceError> {
    let wire: WireWorkflow = response
        .into_json()
        .map_err(|e| ServiceError::Unknown(format!("Malformed workflow: {}", e)))?;
    Ok(wire.into_workflow()?)
}

impl PdfService for HttpPdfService {
    fn extract(&self, file_name: &str, pdf: &[u8]) -> Result<ExtractionResult, ServiceError> {
        let form = MultipartForm::new().file("file", file_name, PDF_MIME, pdf);
        let wire: WireExtraction = self
            .post_form("pdf/extract", form)?
            .into_json()
            .map_err(|e| ServiceError::Unknown(format!("Malformed extraction: {}", e)))?;
        Ok(wire.into_extraction(self.render_dpi)?)
    }

    fn add_fields(
        &self,
        file_name: &str,
        pdf: &[u8],
        fields: &[FieldRequest],
    ) -> Result<Vec<u8>, ServiceError> {
        let form = upload_form(file_name, pdf, fields)?;
        read_bytes(self.post_form("pdf/add-fields", form)?)
    }

    fn create_workflow(
        &self,
        file_name: &str,
        pdf: &[u8],
        fields: &[FieldRequest],
    ) -> Result<Workflow, ServiceError> {
        let form = upload_form(file_name, pdf, fields)?;
        read_workflow(self.post_form("workflow", form)?)
    }

    fn get_workflow(&self, id: WorkflowId) -> Result<Workflow, ServiceError> {
        read_workflow(self.get(&format!("workflow/{}", id))?)
    }

    fn download_workflow(&self, id: WorkflowId) -> Result<Vec<u8>, ServiceError> {
        read_bytes(self.get(&format!("workflow/{}/download", id))?)
    }

    fn sign(&self, id: WorkflowId, request: &SignRequest) -> Result<(), ServiceError> {
        let url = self.endpoint(&format!("workflow/{}/sign", id));
        log::debug!("POST {} as {}", url, request.signer_role);
        self.agent
            .post(&url)
            .send_json(request)
            .map_err(classify)?;
        Ok(())
    }
}
