//! HTTP implementation of [`pdf_fields::PdfService`]

mod client;
mod config;
pub mod multipart;
mod types;
pub mod wire;

pub use client::{HttpPdfService, classify};
pub use config::{DEFAULT_BASE_URL, ServiceConfig};
pub use types::*;
