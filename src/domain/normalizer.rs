//! Type normalization.
//!
//! Maps graph types onto the closed set of AST nodes. Named struct types
//! become references plus a single record definition in the program; the
//! program is threaded through by `&mut` and doubles as the dedup registry.

use tracing::trace;

use super::ast::{AstNode, BuiltInKind, StructProperty, TypeLiteralStruct};
use super::error::{ErrorKind, ExtractError};
use super::options::{ExtractOptions, UnrepresentablePolicy};
use super::program::Program;
use super::type_graph::{BasicKind, Field, NamedType, TypeDesc, TypeGraph, TypeId};
use super::well_known;

pub struct TypeNormalizer<'g> {
    graph: &'g TypeGraph,
    policy: UnrepresentablePolicy,
}

impl<'g> TypeNormalizer<'g> {
    pub fn new(graph: &'g TypeGraph, options: &ExtractOptions) -> Self {
        Self {
            graph,
            policy: options.unrepresentable,
        }
    }

    /// Optionality of a parameter or field: pointers are optional.
    pub fn is_optional(&self, ty: TypeId) -> bool {
        self.graph.is_pointer(ty)
    }

    pub fn normalize(&self, ty: TypeId, program: &mut Program) -> Result<AstNode, ExtractError> {
        match self.graph.ty(ty) {
            TypeDesc::Basic { basic } => match builtin_for(*basic) {
                Some(kind) => Ok(AstNode::BuiltIn(kind)),
                None => self.unrepresentable(basic.name()),
            },
            TypeDesc::Pointer { elem } => self.normalize(*elem, program),
            TypeDesc::Struct { fields } => Ok(AstNode::TypeLiteral(self.struct_literal(fields, program)?)),
            TypeDesc::Named(named) => self.named(ty, named, program),
            TypeDesc::Slice { elem } | TypeDesc::Array { elem, .. } => {
                Ok(AstNode::array(self.normalize(*elem, program)?))
            }
            TypeDesc::Map { key, value } => {
                let key = self.normalize(*key, program)?;
                if key != AstNode::BuiltIn(BuiltInKind::String) {
                    return Err(ExtractError::new(ErrorKind::InvalidMapKey));
                }
                let value = self.normalize(*value, program)?;
                Ok(AstNode::map(key, value))
            }
            other @ (TypeDesc::Interface { .. }
            | TypeDesc::Signature(_)
            | TypeDesc::Chan { .. }
            | TypeDesc::TypeParam { .. }) => self.unrepresentable(other.label()),
        }
    }

    fn named(&self, id: TypeId, named: &NamedType, program: &mut Program) -> Result<AstNode, ExtractError> {
        let package = named.package.as_ref();
        if let Some(known) = well_known::lookup(package.map(|p| p.path.as_str()), &named.name) {
            if !program.is_defined(known.record_name, known.record_path) {
                trace!(record = known.record_name, "registering well-known record");
                program.push(AstNode::Record(known.record()));
            }
            return Ok(AstNode::custom(known.record_name));
        }

        if let TypeDesc::Struct { fields } = self.graph.ty(self.graph.underlying(id)) {
            let path = package.map(|p| p.qualified_path()).unwrap_or_default();
            if !program.is_defined(&named.name, &path) {
                trace!(record = %named.name, %path, "registering record");
                let slot = program.reserve_record(&named.name, &path);
                let literal = self.struct_literal(fields, program)?;
                program.fill_record(slot, literal);
            }
        }
        Ok(AstNode::custom(named.name.as_str()))
    }

    fn struct_literal(&self, fields: &[Field], program: &mut Program) -> Result<TypeLiteralStruct, ExtractError> {
        let mut properties = Vec::with_capacity(fields.len());
        for field in fields {
            properties.push(StructProperty {
                name: field.name.clone(),
                ty: self.normalize(field.ty, program)?,
                optional: self.is_optional(field.ty),
            });
        }
        Ok(TypeLiteralStruct { properties })
    }

    fn unrepresentable(&self, what: &str) -> Result<AstNode, ExtractError> {
        match self.policy {
            UnrepresentablePolicy::Any => Ok(AstNode::BuiltIn(BuiltInKind::Any)),
            UnrepresentablePolicy::Error => Err(ExtractError::new(ErrorKind::InvalidType(what.to_string()))),
        }
    }
}

fn builtin_for(basic: BasicKind) -> Option<BuiltInKind> {
    match basic {
        BasicKind::String => Some(BuiltInKind::String),
        BasicKind::Bool => Some(BuiltInKind::Boolean),
        BasicKind::Int
        | BasicKind::Int8
        | BasicKind::Int16
        | BasicKind::Int32
        | BasicKind::Int64
        | BasicKind::Uint
        | BasicKind::Uint8
        | BasicKind::Uint16
        | BasicKind::Uint32
        | BasicKind::Uint64
        | BasicKind::Uintptr => Some(BuiltInKind::Integer),
        BasicKind::Float32 | BasicKind::Float64 => Some(BuiltInKind::Float),
        BasicKind::Complex64
        | BasicKind::Complex128
        | BasicKind::UnsafePointer
        | BasicKind::UntypedNil
        | BasicKind::Invalid => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::NodeKind;
    use crate::domain::type_graph::{GraphBuilder, PackageRef};

    fn normalize_one(graph: &TypeGraph, ty: TypeId) -> (Result<AstNode, ExtractError>, Program) {
        let mut program = Program::new();
        let result = TypeNormalizer::new(graph, &ExtractOptions::default()).normalize(ty, &mut program);
        (result, program)
    }

    #[test]
    fn test_integer_and_float_widths_collapse() {
        let mut b = GraphBuilder::new("example.com/svc", "svc");
        let ids: Vec<_> = [BasicKind::Int8, BasicKind::Int64, BasicKind::Uint32]
            .into_iter()
            .map(|k| b.basic(k))
            .collect();
        let f32_id = b.basic(BasicKind::Float32);
        let graph = b.build();

        for id in ids {
            assert_eq!(normalize_one(&graph, id).0.unwrap(), AstNode::BuiltIn(BuiltInKind::Integer));
        }
        assert_eq!(normalize_one(&graph, f32_id).0.unwrap(), AstNode::BuiltIn(BuiltInKind::Float));
    }

    #[test]
    fn test_pointer_is_transparent() {
        let mut b = GraphBuilder::new("example.com/svc", "svc");
        let int = b.basic(BasicKind::Int);
        let ptr = b.pointer(int);
        let ptr_ptr = b.pointer(ptr);
        let graph = b.build();
        let normalizer = TypeNormalizer::new(&graph, &ExtractOptions::default());

        assert_eq!(normalize_one(&graph, ptr_ptr).0.unwrap(), AstNode::BuiltIn(BuiltInKind::Integer));
        assert!(normalizer.is_optional(ptr));
        assert!(!normalizer.is_optional(int));
    }

    #[test]
    fn test_map_key_must_be_string() {
        let mut b = GraphBuilder::new("example.com/svc", "svc");
        let string = b.basic(BasicKind::String);
        let int = b.basic(BasicKind::Int);
        let good = b.map(string, int);
        let bad = b.map(int, string);
        let graph = b.build();

        assert_eq!(
            normalize_one(&graph, good).0.unwrap(),
            AstNode::map(AstNode::BuiltIn(BuiltInKind::String), AstNode::BuiltIn(BuiltInKind::Integer))
        );
        assert_eq!(normalize_one(&graph, bad).0.unwrap_err().kind, ErrorKind::InvalidMapKey);
    }

    #[test]
    fn test_named_string_key_is_rejected() {
        let mut b = GraphBuilder::new("example.com/svc", "svc");
        let string = b.basic(BasicKind::String);
        let id = b.named("ID", string);
        let int = b.basic(BasicKind::Int);
        let map = b.map(id, int);
        let graph = b.build();

        assert_eq!(normalize_one(&graph, map).0.unwrap_err().kind, ErrorKind::InvalidMapKey);
    }

    #[test]
    fn test_slices_and_arrays_become_arrays() {
        let mut b = GraphBuilder::new("example.com/svc", "svc");
        let string = b.basic(BasicKind::String);
        let slice = b.slice(string);
        let array = b.array(string, 4);
        let graph = b.build();

        let expected = AstNode::array(AstNode::BuiltIn(BuiltInKind::String));
        assert_eq!(normalize_one(&graph, slice).0.unwrap(), expected);
        assert_eq!(normalize_one(&graph, array).0.unwrap(), expected);
    }

    #[test]
    fn test_anonymous_struct_is_inlined() {
        let mut b = GraphBuilder::new("example.com/svc", "svc");
        let int = b.basic(BasicKind::Int);
        let opt = b.pointer(int);
        let anon = b.struct_type(&[("count", int), ("limit", opt)]);
        let graph = b.build();

        let (result, program) = normalize_one(&graph, anon);
        let AstNode::TypeLiteral(literal) = result.unwrap() else {
            panic!("expected inline literal");
        };
        assert_eq!(literal.properties.len(), 2);
        assert!(!literal.properties[0].optional);
        assert!(literal.properties[1].optional);
        assert!(program.body().is_empty());
    }

    #[test]
    fn test_named_struct_registers_once() {
        let mut b = GraphBuilder::new("example.com/svc", "svc");
        let string = b.basic(BasicKind::String);
        let body = b.struct_type(&[("name", string)]);
        let user = b.named("User", body);
        let users = b.slice(user);
        let graph = b.build();
        let normalizer = TypeNormalizer::new(&graph, &ExtractOptions::default());

        let mut program = Program::new();
        assert_eq!(normalizer.normalize(user, &mut program).unwrap(), AstNode::custom("User"));
        normalizer.normalize(users, &mut program).unwrap();

        assert_eq!(program.records().count(), 1);
        let record = program.record("User").unwrap();
        assert_eq!(record.path, "example.com/svc/svc");
        assert_eq!(record.type_literal.properties[0].name, "name");
    }

    #[test]
    fn test_self_referential_record_terminates() {
        let mut b = GraphBuilder::new("example.com/svc", "svc");
        let int = b.basic(BasicKind::Int);
        let node = b.declare_named("Node");
        let next = b.pointer(node);
        let children = b.slice(node);
        let body = b.struct_type(&[("value", int), ("next", next), ("children", children)]);
        b.set_underlying(node, body);
        let graph = b.build();

        let (result, program) = normalize_one(&graph, node);
        assert_eq!(result.unwrap(), AstNode::custom("Node"));
        assert_eq!(program.body().len(), 1);
        let props = &program.record("Node").unwrap().type_literal.properties;
        assert_eq!(props[1].ty, AstNode::custom("Node"));
        assert!(props[1].optional);
        assert_eq!(props[2].ty, AstNode::array(AstNode::custom("Node")));
    }

    #[test]
    fn test_nested_records_in_first_seen_order() {
        let mut b = GraphBuilder::new("example.com/svc", "svc");
        let string = b.basic(BasicKind::String);
        let addr_body = b.struct_type(&[("street", string)]);
        let address = b.named("Address", addr_body);
        let user_body = b.struct_type(&[("address", address)]);
        let user = b.named("User", user_body);
        let graph = b.build();

        let (_, program) = normalize_one(&graph, user);
        let names: Vec<_> = program.records().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["User", "Address"]);
    }

    #[test]
    fn test_named_non_struct_is_reference_without_definition() {
        let mut b = GraphBuilder::new("example.com/svc", "svc");
        let string = b.basic(BasicKind::String);
        let status = b.named("Status", string);
        let graph = b.build();

        let (result, program) = normalize_one(&graph, status);
        assert_eq!(result.unwrap(), AstNode::custom("Status"));
        assert!(program.body().is_empty());
    }

    #[test]
    fn test_context_becomes_synthetic_record() {
        let mut b = GraphBuilder::new("example.com/svc", "svc");
        let ctx = b.context_type();
        let ctx_ptr = b.pointer(ctx);
        let graph = b.build();
        let normalizer = TypeNormalizer::new(&graph, &ExtractOptions::default());

        let mut program = Program::new();
        assert_eq!(normalizer.normalize(ctx, &mut program).unwrap(), AstNode::custom("GnzContext"));
        assert_eq!(normalizer.normalize(ctx_ptr, &mut program).unwrap(), AstNode::custom("GnzContext"));
        assert_eq!(program.body().len(), 1);
        assert_eq!(program.body()[0].kind(), NodeKind::StructLiteral);
        assert_eq!(program.body()[0].path(), Some("context"));
    }

    #[test]
    fn test_context_named_struct_elsewhere_is_not_special() {
        let mut b = GraphBuilder::new("example.com/svc", "svc");
        let body = b.struct_type(&[]);
        let ctx = b.named_in(Some(PackageRef::new("example.com/context", "context")), "Context", body);
        let graph = b.build();

        let (result, program) = normalize_one(&graph, ctx);
        assert_eq!(result.unwrap(), AstNode::custom("Context"));
        assert!(program.record("Context").is_some());
    }

    #[test]
    fn test_same_name_in_two_packages_gives_two_records() {
        let mut b = GraphBuilder::new("example.com/svc", "svc");
        let string = b.basic(BasicKind::String);
        let local_body = b.struct_type(&[("id", string)]);
        let local = b.named("Item", local_body);
        let foreign_body = b.struct_type(&[("sku", string)]);
        let foreign = b.named_in(Some(PackageRef::new("example.com/stock", "stock")), "Item", foreign_body);
        let pair = b.struct_type(&[("local", local), ("foreign", foreign), ("again", local)]);
        let graph = b.build();

        let (result, program) = normalize_one(&graph, pair);
        result.unwrap();
        let records: Vec<_> = program.records().map(|r| (r.name.as_str(), r.path.as_str())).collect();
        assert_eq!(
            records,
            vec![("Item", "example.com/svc/svc"), ("Item", "example.com/stock/stock")]
        );
    }

    #[test]
    fn test_unrepresentable_policy() {
        let mut b = GraphBuilder::new("example.com/svc", "svc");
        let iface = b.interface(&[]);
        let int = b.basic(BasicKind::Int);
        let ch = b.chan(int);
        let complex = b.basic(BasicKind::Complex128);
        let graph = b.build();

        for ty in [iface, ch, complex] {
            assert_eq!(normalize_one(&graph, ty).0.unwrap(), AstNode::BuiltIn(BuiltInKind::Any));
        }

        let strict = TypeNormalizer::new(&graph, &ExtractOptions::strict());
        let err = strict.normalize(ch, &mut Program::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidType("chan".to_string()));
        let err = strict.normalize(complex, &mut Program::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidType("complex128".to_string()));
    }
}
