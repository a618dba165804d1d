use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use pdf_async_runtime::{PdfCommand, PdfUpdate, worker_task};
use pdf_fields::PdfService;
use tokio::sync::mpsc;

/// Connection to a background service worker
pub struct WorkerHandle {
    command_tx: mpsc::UnboundedSender<PdfCommand>,
    update_rx: mpsc::UnboundedReceiver<PdfUpdate>,
}

impl WorkerHandle {
    pub fn spawn<S>(service: S) -> Self
    where
        S: PdfService + Send + Sync + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        tokio::spawn(worker_task(Arc::new(service), command_rx, update_tx));
        Self {
            command_tx,
            update_rx,
        }
    }

    /// Send one command and wait for its update. Failures become errors.
    pub async fn request(&mut self, cmd: PdfCommand) -> Result<PdfUpdate> {
        self.command_tx
            .send(cmd)
            .map_err(|_| anyhow!("Service worker stopped"))?;
        let update = self
            .update_rx
            .recv()
            .await
            .context("Service worker stopped")?;
        match update {
            PdfUpdate::Failed { kind, error, .. } => Err(anyhow!("{:?} failed: {}", kind, error)),
            update => Ok(update),
        }
    }
}
