//! Bootstrap configuration consumed from the ORM's property map.
//!
//! The core validates presence and shape of these properties but does not
//! interpret them; the connection URI is handed to the transport layer
//! untouched.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use crate::{DialectError, Result};

pub const PROP_DIALECT: &str = "dialect";
pub const PROP_CONNECTION_PROVIDER: &str = "connection.provider";
pub const PROP_CONNECTION_URI: &str = "connection.uri";

const URI_SCHEMES: [&str; 2] = ["mongodb://", "mongodb+srv://"];

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DialectConfig {
    /// Fully qualified dialect name the ORM was bootstrapped with.
    pub dialect: String,
    /// Fully qualified connection-provider name.
    pub connection_provider: String,
    /// Connection URI, passed through to the transport layer.
    pub connection_uri: String,
}

impl DialectConfig {
    /// Build a config from an explicit property map. Pure: no process-wide
    /// state is read or written. Missing or empty required properties are
    /// configuration errors, fatal to bootstrap.
    pub fn from_properties(properties: &HashMap<String, String>) -> Result<Self> {
        let dialect = required(properties, PROP_DIALECT)?;
        let connection_provider = required(properties, PROP_CONNECTION_PROVIDER)?;
        let connection_uri = required(properties, PROP_CONNECTION_URI)?;

        if !URI_SCHEMES.iter().any(|s| connection_uri.starts_with(s)) {
            warn!(uri = %connection_uri, "connection URI has an unrecognized scheme");
            return Err(DialectError::Configuration(format!(
                "property {:?} must start with one of {:?}",
                PROP_CONNECTION_URI, URI_SCHEMES
            )));
        }

        Ok(Self {
            dialect,
            connection_provider,
            connection_uri,
        })
    }
}

fn required(properties: &HashMap<String, String>, key: &str) -> Result<String> {
    match properties.get(key) {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        Some(_) => Err(DialectError::Configuration(format!(
            "property {:?} is empty",
            key
        ))),
        None => Err(DialectError::Configuration(format!(
            "property {:?} is missing",
            key
        ))),
    }
}
