//! The contract boundary with the ORM's statement abstraction.
//!
//! A [`StatementIntent`] carries one parameterized operation: the kind, the
//! resolved target collection, and the values the ORM bound to the
//! statement's parameters. It is consumed exactly once to build one
//! [`AstCommand`], then discarded.

use tracing::debug;

use crate::ast::{AstDocument, AstValue};
use crate::builder::CommandBuilder;
use crate::command::AstCommand;
use crate::{DialectError, Result};

/// Operation kinds the dialect translates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Insert,
    Find,
    Update,
    Delete,
    Aggregate,
}

impl OperationKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "insert" => Some(OperationKind::Insert),
            "find" | "select" => Some(OperationKind::Find),
            "update" => Some(OperationKind::Update),
            "delete" => Some(OperationKind::Delete),
            "aggregate" => Some(OperationKind::Aggregate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Insert => "insert",
            OperationKind::Find => "find",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
            OperationKind::Aggregate => "aggregate",
        }
    }
}

/// One ORM-issued operation, pre-translation.
///
/// Bindings keep their call order; that order becomes the wire field order.
#[derive(Debug)]
pub struct StatementIntent {
    kind: OperationKind,
    collection: String,
    bindings: Vec<(String, AstValue)>,
    filter: Option<AstDocument>,
    update: Option<AstDocument>,
    projection: Option<AstDocument>,
    sort: Option<AstDocument>,
    pipeline: Vec<AstDocument>,
    skip: Option<i64>,
    limit: Option<i64>,
    multi: bool,
    upsert: bool,
}

impl StatementIntent {
    pub fn new(kind: OperationKind, collection: impl Into<String>) -> Self {
        Self {
            kind,
            collection: collection.into(),
            bindings: Vec::new(),
            filter: None,
            update: None,
            projection: None,
            sort: None,
            pipeline: Vec::new(),
            skip: None,
            limit: None,
            multi: false,
            upsert: false,
        }
    }

    /// Bind the next parameter value under `field`.
    pub fn bind(mut self, field: impl Into<String>, value: AstValue) -> Self {
        self.bindings.push((field.into(), value));
        self
    }

    pub fn with_filter(mut self, filter: AstDocument) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_update(mut self, update: AstDocument) -> Self {
        self.update = Some(update);
        self
    }

    pub fn with_projection(mut self, projection: AstDocument) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn with_sort(mut self, sort: AstDocument) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_stage(mut self, stage: AstDocument) -> Self {
        self.pipeline.push(stage);
        self
    }

    pub fn with_skip(mut self, skip: i64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    pub fn upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Translate into one command, consuming the intent.
    pub fn into_command(self) -> Result<AstCommand> {
        debug!(kind = self.kind.as_str(), collection = %self.collection, "translating statement intent");
        match self.kind {
            OperationKind::Insert => CommandBuilder::insert(self.collection, self.bindings),
            OperationKind::Find => CommandBuilder::find(
                self.collection,
                self.filter.unwrap_or_default(),
                self.projection,
                self.sort,
                self.skip,
                self.limit,
            ),
            OperationKind::Update => {
                let update = self.update.ok_or_else(|| {
                    DialectError::Construction("update intent is missing an update document".into())
                })?;
                CommandBuilder::update(
                    self.collection,
                    self.filter.unwrap_or_default(),
                    update,
                    self.multi,
                    self.upsert,
                )
            }
            OperationKind::Delete => {
                // A bounded delete maps to the single-document form.
                let limit = match self.limit {
                    None | Some(0) => 0,
                    Some(_) => 1,
                };
                CommandBuilder::delete(self.collection, self.filter.unwrap_or_default(), limit)
            }
            OperationKind::Aggregate => CommandBuilder::aggregate(self.collection, self.pipeline),
        }
    }
}
