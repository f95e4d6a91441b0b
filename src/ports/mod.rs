use std::path::Path;

use anyhow::Result;

use crate::domain::type_graph::TypeGraph;

/// Where type graphs come from. Implementations must be shareable across
/// the batch worker threads.
pub trait TypeGraphSource: Send + Sync {
    fn load(&self, location: &Path) -> Result<TypeGraph>;
}

/// Where finished documents go. `None` means standard output.
pub trait OutputExporter: Send + Sync {
    fn export(&self, document: &serde_json::Value, destination: Option<&Path>) -> Result<()>;
}
