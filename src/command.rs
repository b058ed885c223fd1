//! Command envelopes: one variant per operation kind, each rendering to the
//! database's standard command document.

use bytes::BytesMut;

use crate::ast::render::render_document;
use crate::ast::{AstDocument, AstElement, AstValue};

/// A fully constructed, immutable command ready for the transport layer.
///
/// Variants own their collection name (validated non-empty at construction
/// by [`crate::builder::CommandBuilder`]) and an operation-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum AstCommand {
    /// `{insert: <coll>, documents: [<document>]}`
    Insert {
        collection: String,
        document: AstDocument,
    },
    /// `{find: <coll>, filter: ..., projection: ..., sort: ..., skip: ..., limit: ...}`
    Find {
        collection: String,
        filter: AstDocument,
        projection: Option<AstDocument>,
        sort: Option<AstDocument>,
        skip: Option<i64>,
        limit: Option<i64>,
    },
    /// `{update: <coll>, updates: [{q: ..., u: ...}]}`
    Update {
        collection: String,
        query: AstDocument,
        update: AstDocument,
    },
    /// `{delete: <coll>, deletes: [{q: ..., limit: 0|1}]}`
    Delete {
        collection: String,
        query: AstDocument,
        /// 0 = all matches, 1 = single document.
        limit: i32,
    },
    /// `{aggregate: <coll>, pipeline: [...], cursor: {}}`
    Aggregate {
        collection: String,
        pipeline: Vec<AstDocument>,
    },
}

impl AstCommand {
    pub fn collection(&self) -> &str {
        match self {
            AstCommand::Insert { collection, .. }
            | AstCommand::Find { collection, .. }
            | AstCommand::Update { collection, .. }
            | AstCommand::Delete { collection, .. }
            | AstCommand::Aggregate { collection, .. } => collection,
        }
    }

    /// The command's name element key, which doubles as the operation name.
    pub fn name(&self) -> &'static str {
        match self {
            AstCommand::Insert { .. } => "insert",
            AstCommand::Find { .. } => "find",
            AstCommand::Update { .. } => "update",
            AstCommand::Delete { .. } => "delete",
            AstCommand::Aggregate { .. } => "aggregate",
        }
    }

    /// Serialize the command envelope into `dst` as one wire document.
    ///
    /// Re-entrant and deterministic: rendering the same command twice
    /// produces byte-identical output.
    pub fn render(&self, dst: &mut BytesMut) {
        render_document(&self.envelope(), dst);
    }

    /// Rendered size convenience for callers that frame messages.
    pub fn to_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::new();
        self.render(&mut buf);
        buf
    }

    fn envelope(&self) -> AstDocument {
        // Names here are literal command keys; they satisfy element-name
        // validation by construction.
        let field = |name: &str, value: AstValue| AstElement {
            name: name.to_string(),
            value,
        };
        match self {
            AstCommand::Insert {
                collection,
                document,
            } => vec![
                field("insert", AstValue::String(collection.clone())),
                field(
                    "documents",
                    AstValue::Array(vec![AstValue::Document(document.clone())]),
                ),
            ],
            AstCommand::Find {
                collection,
                filter,
                projection,
                sort,
                skip,
                limit,
            } => {
                let mut elements = vec![
                    field("find", AstValue::String(collection.clone())),
                    field("filter", AstValue::Document(filter.clone())),
                ];
                if let Some(projection) = projection {
                    elements.push(field("projection", AstValue::Document(projection.clone())));
                }
                if let Some(sort) = sort {
                    elements.push(field("sort", AstValue::Document(sort.clone())));
                }
                if let Some(skip) = skip {
                    elements.push(field("skip", AstValue::Int64(*skip)));
                }
                if let Some(limit) = limit {
                    elements.push(field("limit", AstValue::Int64(*limit)));
                }
                elements
            }
            AstCommand::Update {
                collection,
                query,
                update,
            } => vec![
                field("update", AstValue::String(collection.clone())),
                field(
                    "updates",
                    AstValue::Array(vec![AstValue::Document(vec![
                        field("q", AstValue::Document(query.clone())),
                        field("u", AstValue::Document(update.clone())),
                    ])]),
                ),
            ],
            AstCommand::Delete {
                collection,
                query,
                limit,
            } => vec![
                field("delete", AstValue::String(collection.clone())),
                field(
                    "deletes",
                    AstValue::Array(vec![AstValue::Document(vec![
                        field("q", AstValue::Document(query.clone())),
                        field("limit", AstValue::Int32(*limit)),
                    ])]),
                ),
            ],
            AstCommand::Aggregate {
                collection,
                pipeline,
            } => vec![
                field("aggregate", AstValue::String(collection.clone())),
                field(
                    "pipeline",
                    AstValue::Array(
                        pipeline
                            .iter()
                            .map(|stage| AstValue::Document(stage.clone()))
                            .collect(),
                    ),
                ),
                field("cursor", AstValue::Document(vec![])),
            ],
        }
    }
}
