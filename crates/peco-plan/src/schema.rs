//! Deferred schema sources for the structured-query loader.
//!
//! The query schema usually does not exist when a plan is built; it is written
//! by the data layer later. A [`SchemaSource`] is therefore only a handle and is
//! read when the loader transforms a `.gql` file.

use std::fmt;
use std::fs;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Value, json};

use crate::alias::AliasTable;

/// In-memory schema supplier, e.g. a query builder owned by the caller.
pub trait SchemaProvider: Send + Sync + fmt::Debug {
    /// Current schema, `None` while it has not been produced yet.
    fn schema(&self) -> Option<Value>;

    /// Per-resource context handed to the loader alongside the schema.
    fn context(&self, resource: &str) -> Value {
        json!({ "resource": resource })
    }
}

#[derive(Clone)]
pub enum SchemaSource {
    /// JSON file addressed through an alias, read on every access
    AliasedFile { alias: String, file: String },
    /// Caller-supplied provider
    Provider(Arc<dyn SchemaProvider>),
}

impl SchemaSource {
    /// `schema.json` inside the `@data` directory.
    pub fn data_file() -> Self {
        SchemaSource::AliasedFile {
            alias: "@data".to_string(),
            file: "schema.json".to_string(),
        }
    }

    pub fn provider(provider: impl SchemaProvider + 'static) -> Self {
        SchemaSource::Provider(Arc::new(provider))
    }

    /// Alias this source depends on, if any.
    pub fn alias(&self) -> Option<&str> {
        match self {
            SchemaSource::AliasedFile { alias, .. } => Some(alias),
            SchemaSource::Provider(_) => None,
        }
    }

    /// Evaluate the schema now. Missing or unreadable files yield `None`.
    pub fn schema(&self, aliases: &AliasTable) -> Option<Value> {
        match self {
            SchemaSource::AliasedFile { alias, file } => {
                let path = aliases.resolve(&format!("{alias}/{file}"))?;
                match fs::read_to_string(&path) {
                    Ok(content) => serde_json::from_str(&content)
                        .inspect_err(|err| tracing::warn!(%path, %err, "invalid query schema"))
                        .ok(),
                    Err(err) => {
                        tracing::debug!(%path, %err, "query schema not available yet");
                        None
                    }
                }
            }
            SchemaSource::Provider(provider) => provider.schema(),
        }
    }

    pub fn context(&self, resource: &str) -> Value {
        match self {
            SchemaSource::AliasedFile { .. } => json!({ "resource": resource }),
            SchemaSource::Provider(provider) => provider.context(resource),
        }
    }
}

impl PartialEq for SchemaSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                SchemaSource::AliasedFile { alias, file },
                SchemaSource::AliasedFile {
                    alias: other_alias,
                    file: other_file,
                },
            ) => alias == other_alias && file == other_file,
            (SchemaSource::Provider(a), SchemaSource::Provider(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSource::AliasedFile { alias, file } => {
                write!(f, "SchemaSource({alias}/{file})")
            }
            SchemaSource::Provider(provider) => write!(f, "SchemaSource({provider:?})"),
        }
    }
}

impl Serialize for SchemaSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("deferred", &true)?;
        match self {
            SchemaSource::AliasedFile { alias, file } => {
                map.serialize_entry("from", &format!("{alias}/{file}"))?
            }
            SchemaSource::Provider(_) => map.serialize_entry("from", "provider")?,
        }
        map.end()
    }
}
