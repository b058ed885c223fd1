//! Query-translation core for targeting MongoDB from an ORM.
//!
//! The ORM hands this crate a [`StatementIntent`] (an operation kind plus
//! bound parameter values) and gets back an immutable [`AstCommand`] that
//! renders itself into BSON, the database's native wire encoding. Framing,
//! sending, and reply handling belong to a [`CommandTransport`]
//! implementation, not to this crate.

use thiserror::Error;

pub mod ast;
pub mod builder;
pub mod command;
pub mod config;
pub mod intent;
pub mod projection;

pub use ast::{AstElement, AstValue, ElementType};
pub use builder::CommandBuilder;
pub use command::AstCommand;
pub use config::DialectConfig;
pub use intent::{OperationKind, StatementIntent};
pub use projection::projected_field_names;

/// Core error type for dialect operations
#[derive(Error, Debug)]
pub enum DialectError {
    #[error("Configuration Error: {0}")]
    Configuration(String),
    #[error("Construction Error: {0}")]
    Construction(String),
    #[error("Extraction Error: {0}")]
    Extraction(String),
    #[error("Not Implemented{}", .note.as_deref().map(|n| format!(": {}", n)).unwrap_or_default())]
    NotImplemented { note: Option<String> },
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

impl DialectError {
    /// Marker for dialect features that are recognized but intentionally
    /// unimplemented. Must surface to the caller, never be swallowed.
    pub fn not_implemented(note: impl Into<String>) -> Self {
        DialectError::NotImplemented {
            note: Some(note.into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DialectError>;

/// Trait for the collaborator that actually ships a rendered command over a
/// connection. Implementations call [`AstCommand::render`] with their own
/// wire writer, frame and send the bytes, and parse the reply with a
/// conformant BSON reader.
pub trait CommandTransport: Send + Sync {
    fn send(&mut self, command: &AstCommand) -> Result<bson::Document>;
}
