//! Resolved type graph for one package.
//!
//! The graph is produced by an external front end (parser, type checker and
//! doc extractor) and handed over as JSON. Types live in a flat arena and
//! refer to each other by [`TypeId`], so recursive types are plain index
//! cycles instead of owning pointers.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Index into [`TypeGraph::types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub usize);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Import path and declared name of a package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageRef {
    pub path: String,
    pub name: String,
}

impl PackageRef {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    /// `<path>/<name>`, the origin string carried by classes and records.
    pub fn qualified_path(&self) -> String {
        format!("{}/{}", self.path, self.name)
    }
}

/// Source location of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    UnsafePointer,
    UntypedNil,
    Invalid,
}

impl BasicKind {
    pub fn name(&self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Complex64 => "complex64",
            BasicKind::Complex128 => "complex128",
            BasicKind::String => "string",
            BasicKind::UnsafePointer => "unsafe.Pointer",
            BasicKind::UntypedNil => "untyped nil",
            BasicKind::Invalid => "invalid",
        }
    }
}

/// One entry of the type arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDesc {
    Basic { basic: BasicKind },
    Pointer { elem: TypeId },
    Named(NamedType),
    Struct { fields: Vec<Field> },
    Slice { elem: TypeId },
    Array { elem: TypeId, len: u64 },
    Map { key: TypeId, value: TypeId },
    Interface {
        #[serde(default)]
        methods: Vec<InterfaceMethod>,
    },
    Signature(Signature),
    Chan { elem: TypeId },
    TypeParam { name: String },
}

impl TypeDesc {
    /// Short kind label used in log lines and error details.
    pub fn label(&self) -> &'static str {
        match self {
            TypeDesc::Basic { .. } => "basic",
            TypeDesc::Pointer { .. } => "pointer",
            TypeDesc::Named(_) => "named",
            TypeDesc::Struct { .. } => "struct",
            TypeDesc::Slice { .. } => "slice",
            TypeDesc::Array { .. } => "array",
            TypeDesc::Map { .. } => "map",
            TypeDesc::Interface { .. } => "interface",
            TypeDesc::Signature(_) => "func",
            TypeDesc::Chan { .. } => "chan",
            TypeDesc::TypeParam { .. } => "type parameter",
        }
    }
}

/// A declared (nominal) type together with the methods declared on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedType {
    pub name: String,
    /// `None` for universe types such as `error`.
    #[serde(default)]
    pub package: Option<PackageRef>,
    pub underlying: TypeId,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub signature: TypeId,
    #[serde(default)]
    pub pointer_receiver: bool,
    #[serde(default)]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeId,
    #[serde(default)]
    pub embedded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceMethod {
    pub name: String,
    pub signature: TypeId,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub params: Vec<Var>,
    #[serde(default)]
    pub results: Vec<Var>,
    #[serde(default)]
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Var {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeId,
}

impl Var {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn unnamed(ty: TypeId) -> Self {
        Self::new("", ty)
    }
}

/// A package-level declaration, in the order the front end reports them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "object", rename_all = "snake_case")]
pub enum Definition {
    TypeName {
        name: String,
        #[serde(rename = "type")]
        ty: TypeId,
        #[serde(default)]
        position: Option<Position>,
    },
    Func {
        name: String,
        signature: TypeId,
        #[serde(default)]
        position: Option<Position>,
    },
    Var {
        name: String,
        #[serde(rename = "type")]
        ty: TypeId,
        #[serde(default)]
        position: Option<Position>,
    },
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::TypeName { name, .. }
            | Definition::Func { name, .. }
            | Definition::Var { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PackageDocs {
    #[serde(default)]
    pub types: Vec<TypeDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDoc {
    pub name: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub methods: Vec<FuncDoc>,
}

impl TypeDoc {
    pub fn method_doc(&self, name: &str) -> Option<&str> {
        self.methods
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.doc.as_str())
            .filter(|doc| !doc.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDoc {
    pub name: String,
    #[serde(default)]
    pub doc: String,
}

/// Structural problems found while validating a decoded graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("type {referenced_by} refers to unknown type {id}")]
    DanglingType { id: TypeId, referenced_by: String },

    #[error("{owner} expects a signature but {id} is a {found}")]
    NotASignature {
        id: TypeId,
        owner: String,
        found: &'static str,
    },

    #[error("named type {id} never reaches a non-named underlying type")]
    CyclicUnderlying { id: TypeId },

    #[error("type {id} contains itself without a named type in between")]
    AnonymousCycle { id: TypeId },
}

/// The whole resolved package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeGraph {
    pub package: PackageRef,
    pub types: Vec<TypeDesc>,
    pub definitions: Vec<Definition>,
    #[serde(default)]
    pub docs: PackageDocs,
}

impl TypeGraph {
    /// Arena lookup. Ids are checked by [`TypeGraph::validate`]; an id from
    /// another graph panics.
    pub fn ty(&self, id: TypeId) -> &TypeDesc {
        &self.types[id.0]
    }

    /// Strips named layers until a structural type is reached.
    pub fn underlying(&self, id: TypeId) -> TypeId {
        let mut current = id;
        // validate() rejects cycles, the bound keeps unvalidated graphs finite
        for _ in 0..=self.types.len() {
            match self.ty(current) {
                TypeDesc::Named(named) => current = named.underlying,
                _ => return current,
            }
        }
        current
    }

    pub fn named(&self, id: TypeId) -> Option<&NamedType> {
        match self.ty(id) {
            TypeDesc::Named(named) => Some(named),
            _ => None,
        }
    }

    pub fn signature(&self, id: TypeId) -> Option<&Signature> {
        match self.ty(id) {
            TypeDesc::Signature(sig) => Some(sig),
            _ => None,
        }
    }

    pub fn is_pointer(&self, id: TypeId) -> bool {
        matches!(self.ty(id), TypeDesc::Pointer { .. })
    }

    pub fn type_doc(&self, name: &str) -> Option<&TypeDoc> {
        self.docs.types.iter().find(|t| t.name == name)
    }

    /// Package-level functions with their signatures.
    pub fn functions(&self) -> impl Iterator<Item = (&str, &Signature)> {
        self.definitions.iter().filter_map(move |def| match def {
            Definition::Func {
                name, signature, ..
            } => self.signature(*signature).map(|sig| (name.as_str(), sig)),
            _ => None,
        })
    }

    /// Checks every reference before the graph reaches the extractor.
    pub fn validate(&self) -> Result<(), GraphError> {
        for (index, desc) in self.types.iter().enumerate() {
            let owner = TypeId(index).to_string();
            for referenced in Self::references(desc) {
                self.check_ref(referenced, &owner)?;
            }
            match desc {
                TypeDesc::Named(named) => {
                    for method in &named.methods {
                        self.check_signature(method.signature, &format!("method {}", method.name))?;
                    }
                }
                TypeDesc::Interface { methods } => {
                    for method in methods {
                        self.check_signature(method.signature, &format!("method {}", method.name))?;
                    }
                }
                _ => {}
            }
        }

        for (index, desc) in self.types.iter().enumerate() {
            if let TypeDesc::Named(_) = desc {
                let id = TypeId(index);
                if matches!(self.ty(self.underlying(id)), TypeDesc::Named(_)) {
                    return Err(GraphError::CyclicUnderlying { id });
                }
            }
        }
        self.check_anonymous_cycles()?;

        for def in &self.definitions {
            let owner = format!("definition {}", def.name());
            match def {
                Definition::TypeName { ty, .. } | Definition::Var { ty, .. } => {
                    self.check_ref(*ty, &owner)?
                }
                Definition::Func { signature, .. } => self.check_signature(*signature, &owner)?,
            }
        }
        Ok(())
    }

    /// Depth-first search over the structural edges. Named types end a path,
    /// so recursion through a declared name is fine; any other cycle would
    /// make the normalizer recurse forever.
    fn check_anonymous_cycles(&self) -> Result<(), GraphError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Visit {
            New,
            Open,
            Done,
        }

        let edges = |id: TypeId| match self.ty(id) {
            TypeDesc::Named(_) => Vec::new(),
            desc => Self::references(desc),
        };
        let mut state = vec![Visit::New; self.types.len()];

        for start in (0..self.types.len()).map(TypeId) {
            if state[start.0] != Visit::New {
                continue;
            }
            state[start.0] = Visit::Open;
            let mut stack = vec![(start, edges(start), 0usize)];

            while let Some((node, refs, next)) = stack.last_mut() {
                if let Some(&child) = refs.get(*next) {
                    *next += 1;
                    match state[child.0] {
                        Visit::Open => return Err(GraphError::AnonymousCycle { id: child }),
                        Visit::New => {
                            state[child.0] = Visit::Open;
                            let child_edges = edges(child);
                            stack.push((child, child_edges, 0));
                        }
                        Visit::Done => {}
                    }
                } else {
                    state[node.0] = Visit::Done;
                    stack.pop();
                }
            }
        }
        Ok(())
    }

    fn check_ref(&self, id: TypeId, owner: &str) -> Result<(), GraphError> {
        if id.0 < self.types.len() {
            Ok(())
        } else {
            Err(GraphError::DanglingType {
                id,
                referenced_by: owner.to_string(),
            })
        }
    }

    fn check_signature(&self, id: TypeId, owner: &str) -> Result<(), GraphError> {
        self.check_ref(id, owner)?;
        match self.ty(id) {
            TypeDesc::Signature(_) => Ok(()),
            other => Err(GraphError::NotASignature {
                id,
                owner: owner.to_string(),
                found: other.label(),
            }),
        }
    }

    fn references(desc: &TypeDesc) -> Vec<TypeId> {
        match desc {
            TypeDesc::Basic { .. } | TypeDesc::TypeParam { .. } => Vec::new(),
            TypeDesc::Pointer { elem }
            | TypeDesc::Slice { elem }
            | TypeDesc::Array { elem, .. }
            | TypeDesc::Chan { elem } => vec![*elem],
            TypeDesc::Map { key, value } => vec![*key, *value],
            TypeDesc::Named(named) => std::iter::once(named.underlying)
                .chain(named.methods.iter().map(|m| m.signature))
                .collect(),
            TypeDesc::Struct { fields } => fields.iter().map(|f| f.ty).collect(),
            TypeDesc::Interface { methods } => methods.iter().map(|m| m.signature).collect(),
            TypeDesc::Signature(sig) => sig
                .params
                .iter()
                .chain(sig.results.iter())
                .map(|v| v.ty)
                .collect(),
        }
    }
}

/// Incremental construction of a [`TypeGraph`], used by tests, benches and
/// front-end shims. Declarations get synthetic positions in `<package>.go`
/// with increasing line numbers.
pub struct GraphBuilder {
    graph: TypeGraph,
    next_line: u32,
    string: Option<TypeId>,
    error: Option<TypeId>,
}

impl GraphBuilder {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            graph: TypeGraph {
                package: PackageRef::new(path, name),
                types: Vec::new(),
                definitions: Vec::new(),
                docs: PackageDocs::default(),
            },
            next_line: 1,
            string: None,
            error: None,
        }
    }

    pub fn package(&self) -> &PackageRef {
        &self.graph.package
    }

    pub fn push(&mut self, desc: TypeDesc) -> TypeId {
        self.graph.types.push(desc);
        TypeId(self.graph.types.len() - 1)
    }

    pub fn basic(&mut self, basic: BasicKind) -> TypeId {
        if basic == BasicKind::String {
            if let Some(id) = self.string {
                return id;
            }
            let id = self.push(TypeDesc::Basic { basic });
            self.string = Some(id);
            return id;
        }
        self.push(TypeDesc::Basic { basic })
    }

    pub fn pointer(&mut self, elem: TypeId) -> TypeId {
        self.push(TypeDesc::Pointer { elem })
    }

    pub fn slice(&mut self, elem: TypeId) -> TypeId {
        self.push(TypeDesc::Slice { elem })
    }

    pub fn array(&mut self, elem: TypeId, len: u64) -> TypeId {
        self.push(TypeDesc::Array { elem, len })
    }

    pub fn map(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.push(TypeDesc::Map { key, value })
    }

    pub fn chan(&mut self, elem: TypeId) -> TypeId {
        self.push(TypeDesc::Chan { elem })
    }

    pub fn struct_type(&mut self, fields: &[(&str, TypeId)]) -> TypeId {
        let fields = fields
            .iter()
            .map(|(name, ty)| Field {
                name: name.to_string(),
                ty: *ty,
                embedded: false,
            })
            .collect();
        self.push(TypeDesc::Struct { fields })
    }

    pub fn struct_with(&mut self, fields: Vec<Field>) -> TypeId {
        self.push(TypeDesc::Struct { fields })
    }

    pub fn interface(&mut self, methods: &[(&str, TypeId)]) -> TypeId {
        let methods = methods
            .iter()
            .map(|(name, signature)| InterfaceMethod {
                name: name.to_string(),
                signature: *signature,
            })
            .collect();
        self.push(TypeDesc::Interface { methods })
    }

    pub fn signature(&mut self, params: &[(&str, TypeId)], results: &[TypeId]) -> TypeId {
        self.push(TypeDesc::Signature(Signature {
            params: params.iter().map(|(name, ty)| Var::new(*name, *ty)).collect(),
            results: results.iter().map(|ty| Var::unnamed(*ty)).collect(),
            variadic: false,
        }))
    }

    /// Named type in the builder's own package.
    pub fn named(&mut self, name: &str, underlying: TypeId) -> TypeId {
        let package = self.graph.package.clone();
        self.named_in(Some(package), name, underlying)
    }

    pub fn named_in(&mut self, package: Option<PackageRef>, name: &str, underlying: TypeId) -> TypeId {
        self.push(TypeDesc::Named(NamedType {
            name: name.to_string(),
            package,
            underlying,
            methods: Vec::new(),
        }))
    }

    /// Named type whose underlying type is set later, for recursive shapes.
    pub fn declare_named(&mut self, name: &str) -> TypeId {
        let placeholder = TypeId(self.graph.types.len());
        self.named(name, placeholder)
    }

    pub fn set_underlying(&mut self, named: TypeId, underlying: TypeId) {
        if let TypeDesc::Named(desc) = &mut self.graph.types[named.0] {
            desc.underlying = underlying;
        }
    }

    /// Declares a method on `named` and returns its position.
    pub fn method(&mut self, named: TypeId, name: &str, signature: TypeId, pointer_receiver: bool) -> Position {
        let position = self.next_position();
        if let TypeDesc::Named(desc) = &mut self.graph.types[named.0] {
            desc.methods.push(MethodDecl {
                name: name.to_string(),
                signature,
                pointer_receiver,
                position: Some(position.clone()),
            });
        }
        position
    }

    /// The universe `error` interface.
    pub fn error_type(&mut self) -> TypeId {
        if let Some(id) = self.error {
            return id;
        }
        let string = self.basic(BasicKind::String);
        let error_sig = self.signature(&[], &[string]);
        let iface = self.interface(&[("Error", error_sig)]);
        let id = self.named_in(None, "error", iface);
        self.error = Some(id);
        id
    }

    /// `context.Context` from the standard library.
    pub fn context_type(&mut self) -> TypeId {
        let iface = self.interface(&[]);
        self.named_in(Some(PackageRef::new("context", "context")), "Context", iface)
    }

    pub fn define_type(&mut self, name: &str, ty: TypeId) {
        let position = Some(self.next_position());
        self.graph.definitions.push(Definition::TypeName {
            name: name.to_string(),
            ty,
            position,
        });
    }

    pub fn define_func(&mut self, name: &str, signature: TypeId) {
        let position = Some(self.next_position());
        self.graph.definitions.push(Definition::Func {
            name: name.to_string(),
            signature,
            position,
        });
    }

    pub fn doc_type(&mut self, name: &str, doc: &str) {
        self.type_doc_mut(name).doc = doc.to_string();
    }

    pub fn doc_method(&mut self, type_name: &str, method: &str, doc: &str) {
        self.type_doc_mut(type_name).methods.push(FuncDoc {
            name: method.to_string(),
            doc: doc.to_string(),
        });
    }

    pub fn build(self) -> TypeGraph {
        self.graph
    }

    fn type_doc_mut(&mut self, name: &str) -> &mut TypeDoc {
        let docs = &mut self.graph.docs.types;
        let index = match docs.iter().position(|t| t.name == name) {
            Some(index) => index,
            None => {
                docs.push(TypeDoc {
                    name: name.to_string(),
                    doc: String::new(),
                    methods: Vec::new(),
                });
                docs.len() - 1
            }
        };
        &mut docs[index]
    }

    fn next_position(&mut self) -> Position {
        let line = self.next_line;
        self.next_line += 1;
        Position {
            file: format!("{}.go", self.graph.package.name),
            line,
            column: 1,
        }
    }
}
