//! Service descriptions
//!
//! A service description bundles the argument schemas of every operation a
//! service exposes, typically shipped as a JSON document next to the SDK.

use crate::ArgumentSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while loading or querying a service description
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read service description '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid service description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate operation '{0}' in service description")]
    DuplicateOperation(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

/// All operation schemas of one service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDescription {
    /// Service name
    pub name: String,

    /// Operation schemas, shared with every command built from them
    #[serde(default)]
    pub operations: Vec<Arc<ArgumentSchema>>,
}

impl ServiceDescription {
    /// Create an empty description
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: Vec::new(),
        }
    }

    /// Add an operation schema
    pub fn operation_schema(mut self, schema: ArgumentSchema) -> Self {
        self.operations.push(Arc::new(schema));
        self
    }

    /// Parse a description from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let description: Self = serde_json::from_str(json)?;
        description.check_unique()?;
        Ok(description)
    }

    /// Load a description from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Get the shared schema of an operation
    pub fn operation(&self, name: &str) -> Result<Arc<ArgumentSchema>, SchemaError> {
        self.operations
            .iter()
            .find(|schema| schema.name == name)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownOperation(name.to_string()))
    }

    /// Names of all operations, in declaration order
    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.iter().map(|schema| schema.name.as_str())
    }

    fn check_unique(&self) -> Result<(), SchemaError> {
        for (i, schema) in self.operations.iter().enumerate() {
            if self.operations[..i].iter().any(|s| s.name == schema.name) {
                return Err(SchemaError::DuplicateOperation(schema.name.clone()));
            }
        }
        Ok(())
    }
}
