//! Class discovery.
//!
//! Scans type definitions in graph order and exposes the first struct that
//! has methods and a constructor. Only one class per package is ever
//! emitted; later candidates are ignored.

use tracing::{debug, info};

use super::ast::{AstNode, Class, Method, Param};
use super::error::{ErrorKind, ExtractError};
use super::normalizer::TypeNormalizer;
use super::options::{is_exported, ExtractOptions};
use super::program::Program;
use super::signature::{check_return_tuple, effective_return};
use super::type_graph::{Definition, TypeDesc, TypeDoc, TypeGraph, TypeId};
use super::type_relations::{identical, intuitive_method_set, MethodRef};

pub struct ClassDiscovery<'g> {
    graph: &'g TypeGraph,
    options: &'g ExtractOptions,
    normalizer: TypeNormalizer<'g>,
}

impl<'g> ClassDiscovery<'g> {
    pub fn new(graph: &'g TypeGraph, options: &'g ExtractOptions) -> Self {
        Self {
            graph,
            options,
            normalizer: TypeNormalizer::new(graph, options),
        }
    }

    /// Builds the program for the first eligible class.
    pub fn discover(&self) -> Result<Program, ExtractError> {
        for def in &self.graph.definitions {
            let Definition::TypeName { name, ty, .. } = def else {
                continue;
            };
            let methods = match self.eligible_methods(name, *ty) {
                Some(methods) => methods,
                None => continue,
            };
            info!(class = %name, methods = methods.len(), "exposing class");
            return self.build_class(name, methods);
        }
        Err(ExtractError::new(ErrorKind::NoClassFound))
    }

    /// The methods to expose when `ty` qualifies as the class.
    fn eligible_methods(&self, name: &str, ty: TypeId) -> Option<Vec<MethodRef<'g>>> {
        if !matches!(self.graph.ty(self.graph.underlying(ty)), TypeDesc::Struct { .. }) {
            return None;
        }
        let methods: Vec<_> = intuitive_method_set(self.graph, ty)
            .into_iter()
            .filter(|m| !self.options.exported_only || is_exported(m.name))
            .collect();
        if methods.is_empty() {
            debug!(candidate = %name, "skipping struct without methods");
            return None;
        }
        if !self.has_constructor(ty) {
            debug!(candidate = %name, constructor = %self.options.constructor_name, "skipping struct without constructor");
            return None;
        }
        Some(methods)
    }

    /// A package-level constructor returning exactly `ty` or `*ty`.
    pub fn has_constructor(&self, ty: TypeId) -> bool {
        self.graph
            .functions()
            .filter(|(name, _)| *name == self.options.constructor_name)
            .any(|(_, sig)| match sig.results.as_slice() {
                [only] => {
                    identical(self.graph, only.ty, ty)
                        || matches!(self.graph.ty(only.ty), TypeDesc::Pointer { elem } if identical(self.graph, *elem, ty))
                }
                _ => false,
            })
    }

    fn build_class(&self, name: &str, methods: Vec<MethodRef<'g>>) -> Result<Program, ExtractError> {
        let type_doc = self.graph.type_doc(name);
        let mut program = Program::new();
        program.push(AstNode::Class(Class {
            name: name.to_string(),
            path: self.graph.package.qualified_path(),
            doc: type_doc.map(|d| d.doc.clone()).filter(|doc| !doc.is_empty()),
            methods: Vec::new(),
        }));

        for method in methods {
            let method = self.process_method(&method, type_doc, &mut program)?;
            program.push_method(method);
        }
        Ok(program)
    }

    /// Validates and normalizes one method. Errors carry the method's
    /// declaration position.
    pub fn process_method(
        &self,
        method: &MethodRef<'g>,
        type_doc: Option<&TypeDoc>,
        program: &mut Program,
    ) -> Result<Method, ExtractError> {
        let at = |err: ExtractError| err.or_position(method.position);
        let sig = self.graph.signature(method.signature).ok_or_else(|| {
            at(ExtractError::new(ErrorKind::InvalidType(format!(
                "method {} has no signature",
                method.name
            ))))
        })?;

        let shape = check_return_tuple(self.graph, &sig.results).map_err(at)?;

        let mut params = Vec::with_capacity(sig.params.len());
        for param in &sig.params {
            params.push(Param {
                name: param.name.clone(),
                ty: self.normalizer.normalize(param.ty, program).map_err(at)?,
                optional: self.normalizer.is_optional(param.ty),
            });
        }
        let return_type = effective_return(&self.normalizer, shape, program).map_err(at)?;

        debug!(method = method.name, params = params.len(), "processed method");
        Ok(Method {
            name: method.name.to_string(),
            doc: type_doc
                .and_then(|d| d.method_doc(method.name))
                .map(str::to_string),
            return_type,
            params,
        })
    }
}
