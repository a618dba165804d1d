use std::fmt;

use thiserror::Error;

use crate::workflow::{SigningEvent, WorkflowStatus};

/// Failures reported by the PDF service boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// The selected file is not a PDF. Raised before any request is issued.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The service answered with a non-success HTTP status.
    #[error("Server error {status}: {message}")]
    Transport { status: u16, message: String },
    #[error("Unexpected error: {0}")]
    Unknown(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldsError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("No document loaded")]
    NoDocument,
    #[error("Add at least one field before creating a signature workflow")]
    NoFields,
    #[error("Field name '{0}' is used by more than one field")]
    DuplicateFieldName(String),
    #[error("A signature workflow already exists for this document")]
    WorkflowAlreadyCreated,
    #[error("No signature workflow has been created")]
    NoWorkflow,
    #[error("It is not {signer}'s turn to sign (workflow is {status})")]
    NotSignersTurn {
        signer: SignerRole,
        status: WorkflowStatus,
    },
    #[error("Invalid transition from {from} on {event}")]
    InvalidTransition {
        from: WorkflowStatus,
        event: SigningEvent,
    },
    #[error("Unknown field '{0}'")]
    UnknownField(String),
    #[error("Field '{0}' is not assigned to this signer")]
    FieldNotOwned(String),
    #[error("Submission is missing values for: {}", .0.join(", "))]
    IncompleteSubmission(Vec<String>),
    #[error("Inconsistent field model: {0}")]
    InconsistentModel(String),
}

pub type Result<T> = std::result::Result<T, FieldsError>;

/// Kind of interactive field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum FieldType {
    Text,
    Checkbox,
    Radio,
}

impl FieldType {
    pub const ALL: [FieldType; 3] = [FieldType::Text, FieldType::Checkbox, FieldType::Radio];

    /// Token carried by a palette drag and used on the wire.
    pub fn token(self) -> &'static str {
        match self {
            FieldType::Text => "TEXT",
            FieldType::Checkbox => "CHECKBOX",
            FieldType::Radio => "RADIO",
        }
    }

    /// Parse a drag token. Unrecognized tokens yield `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.token() == token)
    }

    /// Label used when generating display names ("Texte 1", ...).
    pub fn label(self) -> &'static str {
        match self {
            FieldType::Text => "Texte",
            FieldType::Checkbox => "Case a cocher",
            FieldType::Radio => "Bouton radio",
        }
    }

    /// Default (width, height) in PDF points for a freshly dropped field.
    pub fn default_size(self) -> (f32, f32) {
        match self {
            FieldType::Text => (200.0, 20.0),
            FieldType::Checkbox | FieldType::Radio => (15.0, 15.0),
        }
    }

    /// Checkbox and radio fields hold `"true"`/`"false"`.
    pub fn is_toggle(self) -> bool {
        !matches!(self, FieldType::Text)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Party that owns a field during signing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum SignerRole {
    #[default]
    SignerA,
    SignerB,
}

impl SignerRole {
    pub fn token(self) -> &'static str {
        match self {
            SignerRole::SignerA => "SIGNER_A",
            SignerRole::SignerB => "SIGNER_B",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "SIGNER_A" => Some(SignerRole::SignerA),
            "SIGNER_B" => Some(SignerRole::SignerB),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SignerRole::SignerA => "Signataire A",
            SignerRole::SignerB => "Signataire B",
        }
    }
}

impl fmt::Display for SignerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Bounding box in PDF points. `(x, y)` is the bottom-left corner, `y` measured
/// from the page bottom.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the box lies within `[0, page_width] x [0, page_height]`.
    pub fn fits_page(&self, page_width: f32, page_height: f32) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.x + self.width <= page_width
            && self.y + self.height <= page_height
    }
}
