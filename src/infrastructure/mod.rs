// Infrastructure implementations for service extraction.

pub mod concurrency;
pub mod config;
pub mod logging;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use memmap2::Mmap;
use tracing::debug;

use crate::domain::type_graph::TypeGraph;
use crate::ports::{OutputExporter, TypeGraphSource};

/// Reads a type graph JSON document emitted by the front end.
pub struct JsonGraphLoader;

impl TypeGraphSource for JsonGraphLoader {
    fn load(&self, location: &Path) -> Result<TypeGraph> {
        let file = File::open(location)
            .with_context(|| format!("Failed to open type graph {}", location.display()))?;
        let len = file.metadata()?.len();
        if len == 0 {
            bail!("Type graph {} is empty", location.display());
        }

        // Safety: the map is read-only and dropped before this function returns.
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("Failed to map {}", location.display()))?;
        let graph: TypeGraph = serde_json::from_slice(&mmap)
            .with_context(|| format!("Invalid type graph JSON in {}", location.display()))?;
        graph
            .validate()
            .with_context(|| format!("Inconsistent type graph in {}", location.display()))?;

        debug!(
            path = %location.display(),
            bytes = len,
            types = graph.types.len(),
            definitions = graph.definitions.len(),
            "loaded type graph"
        );
        Ok(graph)
    }
}

/// Pretty-printed JSON, to a file or standard output.
pub struct JsonExporter;

impl OutputExporter for JsonExporter {
    fn export(&self, document: &serde_json::Value, destination: Option<&Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(document)?;
        match destination {
            Some(path) => fs::write(path, text + "\n")
                .with_context(|| format!("Failed to write {}", path.display())),
            None => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                writeln!(handle, "{}", text)?;
                Ok(())
            }
        }
    }
}
