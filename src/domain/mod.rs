// Domain model and extraction core.

pub mod ast;
pub mod discovery;
pub mod error;
pub mod normalizer;
pub mod options;
pub mod program;
pub mod signature;
pub mod type_graph;
pub mod type_relations;
pub mod well_known;

use discovery::ClassDiscovery;
use error::ExtractError;
use options::ExtractOptions;
use program::Program;
use type_graph::TypeGraph;

/// Runs class discovery over one package and returns the finished program.
pub fn extract(graph: &TypeGraph, options: &ExtractOptions) -> Result<Program, ExtractError> {
    ClassDiscovery::new(graph, options).discover()
}
