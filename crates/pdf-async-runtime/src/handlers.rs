use std::sync::Arc;

use pdf_fields::{PdfService, RequestKind, RequestToken, ServiceError, SignRequest, Upload, WorkflowId};
use tokio::sync::mpsc;

use crate::PdfUpdate;

/// Run a blocking service call off the async executor
async fn run_blocking<S, T, F>(service: &Arc<S>, call: F) -> Result<T, ServiceError>
where
    S: PdfService + Send + Sync + 'static,
    T: Send + 'static,
    F: FnOnce(&S) -> Result<T, ServiceError> + Send + 'static,
{
    let service = Arc::clone(service);
    match tokio::task::spawn_blocking(move || call(&service)).await {
        Ok(result) => result,
        Err(e) => Err(ServiceError::Unknown(format!("Task join error: {}", e))),
    }
}

fn send_failure(
    token: RequestToken,
    kind: RequestKind,
    error: ServiceError,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    log::warn!("{:?} request {} failed: {}", kind, token, error);
    let _ = update_tx.send(PdfUpdate::Failed { token, kind, error });
}

pub async fn handle_extract<S>(
    token: RequestToken,
    file_name: String,
    pdf: Vec<u8>,
    service: &Arc<S>,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) where
    S: PdfService + Send + Sync + 'static,
{
    match run_blocking(service, move |s| s.extract(&file_name, &pdf)).await {
        Ok(result) => {
            let _ = update_tx.send(PdfUpdate::Extracted { token, result });
        }
        Err(e) => send_failure(token, RequestKind::Extract, e, update_tx),
    }
}

pub async fn handle_add_fields<S>(
    upload: Upload,
    service: &Arc<S>,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) where
    S: PdfService + Send + Sync + 'static,
{
    let token = upload.token;
    let result = run_blocking(service, move |s| {
        s.add_fields(&upload.file_name, &upload.pdf, &upload.fields)
    })
    .await;
    match result {
        Ok(pdf) => {
            log::info!("Generated document ({} bytes)", pdf.len());
            let _ = update_tx.send(PdfUpdate::FieldsAdded { token, pdf });
        }
        Err(e) => send_failure(token, RequestKind::AddFields, e, update_tx),
    }
}

pub async fn handle_create_workflow<S>(
    upload: Upload,
    service: &Arc<S>,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) where
    S: PdfService + Send + Sync + 'static,
{
    let token = upload.token;
    let result = run_blocking(service, move |s| {
        s.create_workflow(&upload.file_name, &upload.pdf, &upload.fields)
    })
    .await;
    match result {
        Ok(workflow) => {
            let _ = update_tx.send(PdfUpdate::WorkflowLoaded { token, workflow });
        }
        Err(e) => send_failure(token, RequestKind::CreateWorkflow, e, update_tx),
    }
}

pub async fn handle_load_workflow<S>(
    token: RequestToken,
    id: WorkflowId,
    service: &Arc<S>,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) where
    S: PdfService + Send + Sync + 'static,
{
    match run_blocking(service, move |s| s.get_workflow(id)).await {
        Ok(workflow) => {
            let _ = update_tx.send(PdfUpdate::WorkflowLoaded { token, workflow });
        }
        Err(e) => send_failure(token, RequestKind::LoadWorkflow, e, update_tx),
    }
}

/// Submit, then refetch so the editor sees the status the service settled on.
///
/// Once the service accepted the batch, a failed refetch is reported as a
/// failed load, not as a failed signature.
pub async fn handle_sign<S>(
    token: RequestToken,
    id: WorkflowId,
    request: SignRequest,
    service: &Arc<S>,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) where
    S: PdfService + Send + Sync + 'static,
{
    let signer = request.signer_role;
    if let Err(e) = run_blocking(service, move |s| s.sign(id, &request)).await {
        send_failure(token, RequestKind::Sign, e, update_tx);
        return;
    }
    log::info!("Workflow {}: {} signature recorded", id, signer);
    handle_load_workflow(token, id, service, update_tx).await;
}

pub async fn handle_download<S>(
    token: RequestToken,
    id: WorkflowId,
    service: &Arc<S>,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) where
    S: PdfService + Send + Sync + 'static,
{
    match run_blocking(service, move |s| s.download_workflow(id)).await {
        Ok(pdf) => {
            let _ = update_tx.send(PdfUpdate::Downloaded { token, pdf });
        }
        Err(e) => send_failure(token, RequestKind::Download, e, update_tx),
    }
}
