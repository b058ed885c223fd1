//! Builders that turn collection names and field/value bindings into
//! command trees, validating eagerly so rendering never fails.

use tracing::debug;

use crate::ast::{AstDocument, AstElement, AstValue};
use crate::command::AstCommand;
use crate::{DialectError, Result};

pub struct CommandBuilder;

impl CommandBuilder {
    /// Single-document insert containing exactly the given elements in the
    /// given order. Zero elements is legal and produces an empty document.
    /// Duplicate element names are a caller invariant, not rejected here.
    pub fn insert(
        collection: impl Into<String>,
        bindings: Vec<(String, AstValue)>,
    ) -> Result<AstCommand> {
        let collection = validate_collection(collection)?;
        let mut document = Vec::with_capacity(bindings.len());
        for (name, value) in bindings {
            document.push(AstElement::new(name, value)?);
        }
        debug!(collection = %collection, fields = document.len(), "built insert command");
        Ok(AstCommand::Insert {
            collection,
            document,
        })
    }

    pub fn find(
        collection: impl Into<String>,
        filter: AstDocument,
        projection: Option<AstDocument>,
        sort: Option<AstDocument>,
        skip: Option<i64>,
        limit: Option<i64>,
    ) -> Result<AstCommand> {
        let collection = validate_collection(collection)?;
        debug!(collection = %collection, "built find command");
        Ok(AstCommand::Find {
            collection,
            filter,
            projection,
            sort,
            skip,
            limit,
        })
    }

    /// Single-document update. `multi` and `upsert` are recognized options
    /// but their translation is deliberately unimplemented.
    pub fn update(
        collection: impl Into<String>,
        query: AstDocument,
        update: AstDocument,
        multi: bool,
        upsert: bool,
    ) -> Result<AstCommand> {
        let collection = validate_collection(collection)?;
        if multi {
            return Err(DialectError::not_implemented(
                "multi-document update; translate one update spec per statement for now",
            ));
        }
        if upsert {
            return Err(DialectError::not_implemented(
                "upsert; pending result-reporting support in the transport reply path",
            ));
        }
        debug!(collection = %collection, "built update command");
        Ok(AstCommand::Update {
            collection,
            query,
            update,
        })
    }

    /// `limit` follows the wire contract: 0 deletes all matches, 1 a single
    /// document.
    pub fn delete(
        collection: impl Into<String>,
        query: AstDocument,
        limit: i32,
    ) -> Result<AstCommand> {
        let collection = validate_collection(collection)?;
        if limit != 0 && limit != 1 {
            return Err(DialectError::Construction(format!(
                "delete limit must be 0 or 1, got {}",
                limit
            )));
        }
        debug!(collection = %collection, limit, "built delete command");
        Ok(AstCommand::Delete {
            collection,
            query,
            limit,
        })
    }

    /// Aggregation pipeline from pre-composed stage documents. Each stage
    /// must hold exactly one element whose name is the stage operator.
    pub fn aggregate(
        collection: impl Into<String>,
        pipeline: Vec<AstDocument>,
    ) -> Result<AstCommand> {
        let collection = validate_collection(collection)?;
        for stage in &pipeline {
            if stage.len() != 1 {
                return Err(DialectError::Construction(format!(
                    "pipeline stage must have exactly one operator element, got {}",
                    stage.len()
                )));
            }
            let operator = &stage[0].name;
            if !operator.starts_with('$') {
                return Err(DialectError::Construction(format!(
                    "pipeline stage operator {:?} must start with '$'",
                    operator
                )));
            }
        }
        debug!(collection = %collection, stages = pipeline.len(), "built aggregate command");
        Ok(AstCommand::Aggregate {
            collection,
            pipeline,
        })
    }
}

fn validate_collection(collection: impl Into<String>) -> Result<String> {
    let collection = collection.into();
    if collection.is_empty() {
        return Err(DialectError::Construction(
            "collection name must not be empty".into(),
        ));
    }
    // Collection names ride the wire as string values, but reject NULs to
    // keep namespace strings valid too.
    if collection.contains('\0') {
        return Err(DialectError::Construction(format!(
            "collection name {:?} contains an interior NUL",
            collection
        )));
    }
    Ok(collection)
}
