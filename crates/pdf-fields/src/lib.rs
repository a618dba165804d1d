mod field;
mod geometry;
mod model;
pub mod placement;
mod service;
mod session;
mod signer;
pub mod transform;
mod types;
mod workflow;

pub use field::*;
pub use geometry::PageGeometry;
pub use model::{FieldModel, IdGenerator, NameCounters};
pub use placement::{Gesture, PlacementController, drop_field};
pub use service::*;
pub use session::*;
pub use signer::SignerSession;
pub use transform::{DEFAULT_RENDER_DPI, PDF_BASE_DPI, ViewportPoint, ViewportRect};
pub use types::*;
pub use workflow::*;
