//! Typed AST for renderable command fragments.
//!
//! Every node is immutable once constructed and renders itself into a wire
//! writer; trees never hold parent references. Construction validates
//! eagerly so that a successfully built tree is always renderable.

use crate::{DialectError, Result};

pub mod render;

/// An ordered element sequence, the structural unit of the wire format.
pub type AstDocument = Vec<AstElement>;

/// Wire type tags, one per renderable value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ElementType {
    Double = 0x01,
    String = 0x02,
    Document = 0x03,
    Array = 0x04,
    Binary = 0x05,
    Undefined = 0x06,
    ObjectId = 0x07,
    Boolean = 0x08,
    DateTime = 0x09,
    Null = 0x0A,
    Int32 = 0x10,
    Int64 = 0x12,
}

/// A scalar, document, or array value.
#[derive(Debug, Clone, PartialEq)]
pub enum AstValue {
    Double(f64),
    String(String),
    Document(AstDocument),
    Array(Vec<AstValue>),
    Binary { subtype: u8, bytes: Vec<u8> },
    /// Absent value: the enclosing element is omitted from the wire
    /// entirely. Distinct from `Null`, which is written explicitly.
    Undefined,
    ObjectId([u8; 12]),
    Boolean(bool),
    /// UTC milliseconds since the epoch.
    DateTime(i64),
    Null,
    Int32(i32),
    Int64(i64),
}

impl AstValue {
    pub fn element_type(&self) -> ElementType {
        match self {
            AstValue::Double(_) => ElementType::Double,
            AstValue::String(_) => ElementType::String,
            AstValue::Document(_) => ElementType::Document,
            AstValue::Array(_) => ElementType::Array,
            AstValue::Binary { .. } => ElementType::Binary,
            AstValue::Undefined => ElementType::Undefined,
            AstValue::ObjectId(_) => ElementType::ObjectId,
            AstValue::Boolean(_) => ElementType::Boolean,
            AstValue::DateTime(_) => ElementType::DateTime,
            AstValue::Null => ElementType::Null,
            AstValue::Int32(_) => ElementType::Int32,
            AstValue::Int64(_) => ElementType::Int64,
        }
    }

    /// True when this value is skipped by the renderer.
    pub fn is_undefined(&self) -> bool {
        matches!(self, AstValue::Undefined)
    }
}

/// A named field inside a document.
///
/// Names must be valid element names on the wire (non-empty, no interior
/// NUL). Uniqueness within one document is a caller invariant and is not
/// checked here.
#[derive(Debug, Clone, PartialEq)]
pub struct AstElement {
    pub name: String,
    pub value: AstValue,
}

impl AstElement {
    pub fn new(name: impl Into<String>, value: AstValue) -> Result<Self> {
        let name = name.into();
        validate_element_name(&name)?;
        Ok(Self { name, value })
    }
}

pub(crate) fn validate_element_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DialectError::Construction(
            "element name must not be empty".into(),
        ));
    }
    if name.contains('\0') {
        return Err(DialectError::Construction(format!(
            "element name {:?} contains an interior NUL",
            name
        )));
    }
    Ok(())
}
