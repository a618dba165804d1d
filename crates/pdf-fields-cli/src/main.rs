mod layout;
mod logger;
mod worker;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use pdf_async_runtime::{PdfCommand, PdfUpdate, apply_update};
use pdf_fields::{
    ArtifactKind, EditorSession, Field, FieldId, FieldType, PlacementController, RequestKind, RequestToken,
    SignerRole, SignerSession, StepState, Upload, ViewportPoint, Workflow, WorkflowAction,
    WorkflowId, WorkflowStatus, drop_field, ensure_pdf,
};
use pdf_service_client::{HttpPdfService, ServiceConfig};

use crate::layout::Layout;
use crate::logger::StderrLogger;
use crate::worker::WorkerHandle;

#[derive(Parser)]
#[command(name = "pdff", about = "Place form fields on PDFs and run signing workflows", version)]
struct Cli {
    /// Service configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the PDF service, overrides the config file
    #[arg(long, global = true)]
    server: Option<String>,

    /// Log debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the form fields of a PDF and start a layout
    Extract {
        #[arg(short, long)]
        input: PathBuf,

        /// Layout file to write
        #[arg(short, long)]
        layout: Option<PathBuf>,
    },

    /// Drop a new field on a page
    Place {
        #[arg(short, long)]
        layout: PathBuf,

        #[arg(long = "type", value_enum)]
        field_type: FieldTypeArg,

        /// Zero-based page index
        #[arg(long, default_value = "0")]
        page: usize,

        /// Horizontal position of the field's top-left corner, in display pixels
        #[arg(long)]
        x: f32,

        /// Vertical position of the field's top-left corner, in display pixels
        #[arg(long)]
        y: f32,

        /// Width the page is displayed at (defaults to the image's own width)
        #[arg(long)]
        display_width: Option<f32>,
    },

    /// Drag a field by a distance in display pixels
    Move {
        #[arg(short, long)]
        layout: PathBuf,

        #[arg(long)]
        id: u64,

        #[arg(long, allow_hyphen_values = true)]
        dx: f32,

        #[arg(long, allow_hyphen_values = true)]
        dy: f32,

        #[arg(long)]
        display_width: Option<f32>,
    },

    Rename {
        #[arg(short, long)]
        layout: PathBuf,

        #[arg(long)]
        id: u64,

        #[arg(long)]
        name: String,
    },

    /// Set (or clear, without --value) a field's default value
    SetValue {
        #[arg(short, long)]
        layout: PathBuf,

        #[arg(long)]
        id: u64,

        #[arg(long)]
        value: Option<String>,
    },

    /// Choose which signer fills a field
    Assign {
        #[arg(short, long)]
        layout: PathBuf,

        #[arg(long)]
        id: u64,

        #[arg(long, value_enum)]
        signer: SignerArg,
    },

    Remove {
        #[arg(short, long)]
        layout: PathBuf,

        #[arg(long)]
        id: u64,
    },

    /// Show detected and placed fields
    List {
        #[arg(short, long)]
        layout: PathBuf,

        /// Only this page
        #[arg(long)]
        page: Option<usize>,
    },

    /// Write the placed fields into the PDF
    Flatten {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        layout: PathBuf,

        /// Output PDF file
        #[arg(short, long, default_value = ArtifactKind::Generated.default_file_name())]
        output: PathBuf,
    },

    /// Two-party signing workflow
    Workflow {
        #[command(subcommand)]
        action: WorkflowCommand,
    },
}

#[derive(Subcommand)]
enum WorkflowCommand {
    /// Freeze the placed fields into a new workflow
    Create {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        layout: PathBuf,
    },

    Show {
        #[arg(long)]
        id: u64,
    },

    /// Submit a signer's values
    Sign {
        #[arg(long)]
        id: u64,

        #[arg(long, value_enum)]
        signer: SignerArg,

        /// NAME=VALUE for a text field
        #[arg(long = "value", value_parser = parse_assignment)]
        values: Vec<(String, String)>,

        /// Name of a checkbox or radio field to tick
        #[arg(long = "check")]
        checks: Vec<String>,
    },

    /// Save the signed document of a completed workflow
    Download {
        #[arg(long)]
        id: u64,

        #[arg(short, long, default_value = ArtifactKind::Signed.default_file_name())]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FieldTypeArg {
    Text,
    Checkbox,
    Radio,
}

#[derive(Clone, Copy, ValueEnum)]
enum SignerArg {
    A,
    B,
}

impl From<FieldTypeArg> for FieldType {
    fn from(arg: FieldTypeArg) -> Self {
        match arg {
            FieldTypeArg::Text => Self::Text,
            FieldTypeArg::Checkbox => Self::Checkbox,
            FieldTypeArg::Radio => Self::Radio,
        }
    }
}

impl From<SignerArg> for SignerRole {
    fn from(arg: SignerArg) -> Self {
        match arg {
            SignerArg::A => Self::SignerA,
            SignerArg::B => Self::SignerB,
        }
    }
}

fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))
}

async fn load_config(path: Option<&Path>, server: Option<String>) -> Result<ServiceConfig> {
    let mut config = match path {
        Some(path) => ServiceConfig::load(path).await?,
        None => ServiceConfig::default(),
    };
    if let Some(server) = server {
        config.base_url = server;
    }
    config.validate()?;
    Ok(config)
}

async fn read_pdf(path: &Path) -> Result<(String, Vec<u8>)> {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("document.pdf")
        .to_string();
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    ensure_pdf(&file_name, &bytes)?;
    Ok((file_name, bytes))
}

fn print_fields(layout: &Layout, page: Option<usize>) {
    let wanted = |p: usize| page.is_none_or(|only| only == p);
    for (index, size) in layout.pages.iter().enumerate().filter(|(i, _)| wanted(*i)) {
        println!("Page {} ({}x{} px)", index, size.width_px, size.height_px);
        for field in layout.extracted.iter().filter(|f| f.page() == index) {
            let r = field.rect();
            println!(
                "  [pdf] {:<24} {:<8} ({:.1}, {:.1}) {:.0}x{:.0} = {}",
                field.name(),
                field.field_type().token(),
                r.x,
                r.y,
                r.width,
                r.height,
                field.value().unwrap_or("-")
            );
        }
        for field in layout.fields.on_page(index) {
            let r = field.rect();
            println!(
                "  #{:<4} {:<24} {:<8} ({:.1}, {:.1}) {:.0}x{:.0} {}",
                field.id(),
                field.name(),
                field.field_type().token(),
                r.x,
                r.y,
                r.width,
                r.height,
                field.assigned_to().label()
            );
        }
    }
}

fn print_workflow(workflow: &Workflow) {
    let status = workflow.status();
    println!(
        "Workflow {} for {}: {}",
        workflow.id(),
        workflow.file_name(),
        status
    );
    for step in WorkflowStatus::STEPS {
        let mark = match status.step_state(step) {
            StepState::Done => "x",
            StepState::Active => ">",
            StepState::Pending => " ",
        };
        println!("  [{}] {}", mark, step);
    }
    for field in workflow.fields() {
        println!(
            "  {:<24} {:<8} {:<12} {}",
            field.name,
            field.field_type.token(),
            field.assigned_to.label(),
            field.value.as_deref().unwrap_or("-")
        );
    }
    match status.available_action() {
        Some(WorkflowAction::Sign(signer)) => println!("Next: {} signs", signer.label()),
        Some(WorkflowAction::Download) => println!("Next: download the signed document"),
        None => {}
    }
}

async fn save_layout(layout: &Layout, path: &Path) -> Result<()> {
    layout.save(path).await?;
    log::debug!("Saved layout to {}", path.display());
    Ok(())
}

fn expect_workflow(update: PdfUpdate) -> Result<Workflow> {
    match update {
        PdfUpdate::WorkflowLoaded { workflow, .. } => Ok(workflow),
        other => Err(anyhow!("Unexpected update: {:?}", other.token())),
    }
}

fn expect_pdf(update: PdfUpdate) -> Result<Vec<u8>> {
    match update {
        PdfUpdate::FieldsAdded { pdf, .. } | PdfUpdate::Downloaded { pdf, .. } => Ok(pdf),
        other => Err(anyhow!("Unexpected update: {:?}", other.token())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    StderrLogger::new(cli.verbose)
        .init()
        .map_err(|e| anyhow!("Failed to install logger: {}", e))?;

    let config = load_config(cli.config.as_deref(), cli.server).await?;
    let render_dpi = config.render_dpi;
    let mut worker = WorkerHandle::spawn(HttpPdfService::new(&config));

    match cli.command {
        Commands::Extract { input, layout } => {
            let (file_name, pdf) = read_pdf(&input).await?;
            let mut session = EditorSession::new(render_dpi);
            let token = session.begin_upload(&file_name, pdf.clone())?;

            let cmd = PdfCommand::Extract {
                token,
                file_name,
                pdf,
            };
            let update = match worker.request(cmd).await {
                Ok(update) => update,
                Err(e) => {
                    session.record_failure(token, RequestKind::Extract, e.to_string());
                    return Err(e);
                }
            };
            apply_update(&mut session, update);
            let result = session
                .extraction()
                .context("No extraction result received")?;

            let new_layout = Layout::from_extraction(result, render_dpi);
            println!(
                "{}: {} fields on {} pages",
                result.file_name,
                result.total_fields,
                result.pages.len()
            );
            print_fields(&new_layout, None);
            if let Some(path) = layout {
                save_layout(&new_layout, &path).await?;
                println!("Layout → {}", path.display());
            }
        }

        Commands::Place {
            layout: path,
            field_type,
            page,
            x,
            y,
            display_width,
        } => {
            let mut layout = Layout::load(&path).await?;
            if page >= layout.pages.len() {
                bail!("Page {} does not exist ({} pages)", page, layout.pages.len());
            }
            let geometry = layout.geometry(page, display_width);
            let token = FieldType::from(field_type).token();
            let id = drop_field(
                &mut layout.fields,
                &geometry,
                &layout.extracted,
                Some(token),
                page,
                ViewportPoint::new(x, y),
            )
            .context("Page is not measurable, field not placed")?;
            if let Some(field) = layout.fields.get(id) {
                let r = field.rect();
                println!("Placed #{} {} at ({:.1}, {:.1})", id, field.name(), r.x, r.y);
            }
            save_layout(&layout, &path).await?;
        }

        Commands::Move {
            layout: path,
            id,
            dx,
            dy,
            display_width,
        } => {
            let mut layout = Layout::load(&path).await?;
            let id = FieldId(id);
            let page = layout
                .fields
                .get(id)
                .map(|f| f.page())
                .with_context(|| format!("No field #{}", id))?;
            let geometry = layout.geometry(page, display_width);

            let mut controller = PlacementController::new();
            let start = ViewportPoint::default();
            controller.pointer_down(&layout.fields, id, start);
            let moved = controller.pointer_move(
                &mut layout.fields,
                &geometry,
                ViewportPoint::new(start.x + dx, start.y + dy),
            );
            controller.pointer_up();

            if moved {
                save_layout(&layout, &path).await?;
                if let Some(r) = layout.fields.get(id).map(|f| f.rect()) {
                    println!("Moved #{} to ({:.1}, {:.1})", id, r.x, r.y);
                }
            } else {
                println!("#{} unchanged", id);
            }
        }

        Commands::Rename {
            layout: path,
            id,
            name,
        } => {
            let mut layout = Layout::load(&path).await?;
            if layout.fields.rename(FieldId(id), &name) {
                save_layout(&layout, &path).await?;
            } else {
                println!("#{} unchanged", id);
            }
        }

        Commands::SetValue {
            layout: path,
            id,
            value,
        } => {
            let mut layout = Layout::load(&path).await?;
            if layout.fields.set_value(FieldId(id), value) {
                save_layout(&layout, &path).await?;
            } else {
                bail!("No field #{}", id);
            }
        }

        Commands::Assign {
            layout: path,
            id,
            signer,
        } => {
            let mut layout = Layout::load(&path).await?;
            if layout.fields.reassign(FieldId(id), signer.into()) {
                save_layout(&layout, &path).await?;
            } else {
                bail!("No field #{}", id);
            }
        }

        Commands::Remove { layout: path, id } => {
            let mut layout = Layout::load(&path).await?;
            if layout.fields.remove(FieldId(id)) {
                save_layout(&layout, &path).await?;
            } else {
                println!("#{} does not exist", id);
            }
        }

        Commands::List { layout, page } => {
            let layout = Layout::load(&layout).await?;
            print_fields(&layout, page);
            if let Some(id) = layout.workflow_id {
                println!("Workflow {}", id);
            }
        }

        Commands::Flatten {
            input,
            layout,
            output,
        } => {
            let layout = Layout::load(&layout).await?;
            let (file_name, pdf) = read_pdf(&input).await?;
            let upload = Upload {
                token: RequestToken(0),
                file_name,
                pdf,
                fields: layout.fields.flatten_requests(),
            };
            let generated = expect_pdf(worker.request(PdfCommand::AddFields(upload)).await?)?;
            tokio::fs::write(&output, &generated).await?;
            println!("Generated {} fields → {}", layout.fields.len(), output.display());
        }

        Commands::Workflow { action } => match action {
            WorkflowCommand::Create { input, layout: path } => {
                let mut layout = Layout::load(&path).await?;
                if let Some(id) = layout.workflow_id {
                    bail!("Layout already has workflow {}", id);
                }
                let (file_name, pdf) = read_pdf(&input).await?;
                let upload = Upload {
                    token: RequestToken(0),
                    file_name,
                    pdf,
                    fields: layout.fields.workflow_requests()?,
                };
                let workflow =
                    expect_workflow(worker.request(PdfCommand::CreateWorkflow(upload)).await?)?;
                layout.workflow_id = Some(workflow.id());
                save_layout(&layout, &path).await?;
                print_workflow(&workflow);
            }

            WorkflowCommand::Show { id } => {
                let token = RequestToken(0);
                let cmd = PdfCommand::LoadWorkflow {
                    token,
                    id: WorkflowId(id),
                };
                print_workflow(&expect_workflow(worker.request(cmd).await?)?);
            }

            WorkflowCommand::Sign {
                id,
                signer,
                values,
                checks,
            } => {
                let token = RequestToken(0);
                let id = WorkflowId(id);
                let workflow =
                    expect_workflow(worker.request(PdfCommand::LoadWorkflow { token, id }).await?)?;
                let mut session = SignerSession::open(&workflow, signer.into())?;
                for (name, value) in &values {
                    session.set_value(name, value.as_str())?;
                }
                for name in &checks {
                    session.set_checked(name, true)?;
                }
                let request = session.submit();
                let workflow =
                    expect_workflow(worker.request(PdfCommand::Sign { token, id, request }).await?)?;
                print_workflow(&workflow);
            }

            WorkflowCommand::Download { id, output } => {
                let cmd = PdfCommand::Download {
                    token: RequestToken(0),
                    id: WorkflowId(id),
                };
                let signed = expect_pdf(worker.request(cmd).await?)?;
                tokio::fs::write(&output, &signed).await?;
                println!("Signed document → {}", output.display());
            }
        },
    }

    Ok(())
}
