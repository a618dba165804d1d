use std::sync::Arc;

use pdf_fields::PdfService;
use tokio::sync::mpsc;

use crate::handlers;
use crate::{PdfCommand, PdfUpdate};

/// Async worker task that runs service requests and sends updates.
///
/// Ends when the command channel closes.
pub async fn worker_task<S>(
    service: Arc<S>,
    mut command_rx: mpsc::UnboundedReceiver<PdfCommand>,
    update_tx: mpsc::UnboundedSender<PdfUpdate>,
) where
    S: PdfService + Send + Sync + 'static,
{
    while let Some(cmd) = command_rx.recv().await {
        process_command(cmd, &service, &mut command_rx, &update_tx).await;
    }
    log::debug!("Command channel closed, worker stopping");
}

async fn process_command<S>(
    cmd: PdfCommand,
    service: &Arc<S>,
    command_rx: &mut mpsc::UnboundedReceiver<PdfCommand>,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) where
    S: PdfService + Send + Sync + 'static,
{
    let PdfCommand::Extract {
        mut token,
        mut file_name,
        mut pdf,
    } = cmd
    else {
        handle(cmd, service, update_tx).await;
        return;
    };

    // A newer upload supersedes queued ones: keep only the most recent
    let mut deferred = Vec::new();
    while let Ok(next_cmd) = command_rx.try_recv() {
        match next_cmd {
            PdfCommand::Extract {
                token: new_token,
                file_name: new_file_name,
                pdf: new_pdf,
            } => {
                log::debug!("Discarding queued extraction {}, using {}", token, new_token);
                token = new_token;
                file_name = new_file_name;
                pdf = new_pdf;
            }
            other => deferred.push(other),
        }
    }

    handlers::handle_extract(token, file_name, pdf, service, update_tx).await;
    for cmd in deferred {
        handle(cmd, service, update_tx).await;
    }
}

async fn handle<S>(
    cmd: PdfCommand,
    service: &Arc<S>,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) where
    S: PdfService + Send + Sync + 'static,
{
    match cmd {
        PdfCommand::Extract {
            token,
            file_name,
            pdf,
        } => {
            handlers::handle_extract(token, file_name, pdf, service, update_tx).await;
        }
        PdfCommand::AddFields(upload) => {
            handlers::handle_add_fields(upload, service, update_tx).await;
        }
        PdfCommand::CreateWorkflow(upload) => {
            handlers::handle_create_workflow(upload, service, update_tx).await;
        }
        PdfCommand::LoadWorkflow { token, id } => {
            handlers::handle_load_workflow(token, id, service, update_tx).await;
        }
        PdfCommand::Sign { token, id, request } => {
            handlers::handle_sign(token, id, request, service, update_tx).await;
        }
        PdfCommand::Download { token, id } => {
            handlers::handle_download(token, id, service, update_tx).await;
        }
    }
}
