//! Return-shape convention.
//!
//! Exposed methods return either `error` alone or `(T, error)`, where
//! "error" is anything error-like. Nothing else is accepted.

use super::ast::{AstNode, BuiltInKind};
use super::error::{ErrorKind, ExtractError};
use super::normalizer::TypeNormalizer;
use super::program::Program;
use super::type_graph::{TypeGraph, TypeId, Var};
use super::type_relations::is_error_like;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    /// `error`: the effective return type is void.
    ErrorOnly,
    /// `(T, error)`: the effective return type is `T`.
    Value(TypeId),
}

/// Checks a method's result tuple without touching the program.
pub fn check_return_tuple(graph: &TypeGraph, results: &[Var]) -> Result<ReturnShape, ExtractError> {
    match results {
        [only] if is_error_like(graph, only.ty) => Ok(ReturnShape::ErrorOnly),
        [value, err] if is_error_like(graph, err.ty) => Ok(ReturnShape::Value(value.ty)),
        _ => Err(ExtractError::new(ErrorKind::IncorrectReturnTuple)),
    }
}

/// Maps a checked shape to the node emitted as the method's return type.
pub fn effective_return(
    normalizer: &TypeNormalizer<'_>,
    shape: ReturnShape,
    program: &mut Program,
) -> Result<AstNode, ExtractError> {
    match shape {
        ReturnShape::ErrorOnly => Ok(AstNode::BuiltIn(BuiltInKind::Void)),
        ReturnShape::Value(ty) => normalizer.normalize(ty, program),
    }
}
