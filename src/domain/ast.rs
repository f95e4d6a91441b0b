// AST data structures for service extraction.
// These types describe one exposed class and the records its methods use,
// independent of the source language.

use std::fmt;

/// Kind tag of every node. The strings are the fixed wire tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    ClassDefinition,
    MethodDefinition,
    ParameterDefinition,
    StringLiteral,
    IntLiteral,
    BoolLiteral,
    FloatLiteral,
    VoidLiteral,
    AnyLiteral,
    StructLiteral,
    TypeLiteral,
    CustomNodeLiteral,
    ArrayType,
    MapType,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::ClassDefinition => "ClassDefinition",
            NodeKind::MethodDefinition => "MethodDefinition",
            NodeKind::ParameterDefinition => "ParameterDefinition",
            NodeKind::StringLiteral => "StringLiteral",
            NodeKind::IntLiteral => "IntLiteral",
            NodeKind::BoolLiteral => "BoolLiteral",
            NodeKind::FloatLiteral => "FloatLiteral",
            NodeKind::VoidLiteral => "VoidLiteral",
            NodeKind::AnyLiteral => "AnyLiteral",
            NodeKind::StructLiteral => "StructLiteral",
            NodeKind::TypeLiteral => "TypeLiteral",
            NodeKind::CustomNodeLiteral => "CustomNodeLiteral",
            NodeKind::ArrayType => "ArrayType",
            NodeKind::MapType => "MapType",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive leaves. All integer widths share `Integer`, all float widths
/// share `Float`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltInKind {
    String,
    Integer,
    Boolean,
    Float,
    Void,
    Any,
}

impl BuiltInKind {
    pub fn kind(&self) -> NodeKind {
        match self {
            BuiltInKind::String => NodeKind::StringLiteral,
            BuiltInKind::Integer => NodeKind::IntLiteral,
            BuiltInKind::Boolean => NodeKind::BoolLiteral,
            BuiltInKind::Float => NodeKind::FloatLiteral,
            BuiltInKind::Void => NodeKind::VoidLiteral,
            BuiltInKind::Any => NodeKind::AnyLiteral,
        }
    }
}

/// A node in the extracted tree.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    BuiltIn(BuiltInKind),
    /// Reference to a record (or the class) defined elsewhere in the program.
    Custom { name: String },
    Array { element: Box<AstNode> },
    Map { key: Box<AstNode>, value: Box<AstNode> },
    Record(Record),
    TypeLiteral(TypeLiteralStruct),
    Class(Class),
}

impl AstNode {
    pub fn custom(name: impl Into<String>) -> Self {
        AstNode::Custom { name: name.into() }
    }

    pub fn array(element: AstNode) -> Self {
        AstNode::Array {
            element: Box::new(element),
        }
    }

    pub fn map(key: AstNode, value: AstNode) -> Self {
        AstNode::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Display name. Built-ins answer with their kind tag.
    pub fn name(&self) -> Option<&str> {
        match self {
            AstNode::BuiltIn(kind) => Some(kind.kind().as_str()),
            AstNode::Custom { name } => Some(name),
            AstNode::Record(record) => Some(&record.name),
            AstNode::Class(class) => Some(&class.name),
            AstNode::Array { .. } | AstNode::Map { .. } | AstNode::TypeLiteral(_) => None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            AstNode::BuiltIn(kind) => kind.kind(),
            AstNode::Custom { .. } => NodeKind::CustomNodeLiteral,
            AstNode::Array { .. } => NodeKind::ArrayType,
            AstNode::Map { .. } => NodeKind::MapType,
            AstNode::Record(_) => NodeKind::StructLiteral,
            AstNode::TypeLiteral(_) => NodeKind::TypeLiteral,
            AstNode::Class(_) => NodeKind::ClassDefinition,
        }
    }

    /// Originating package, only known for definitions.
    pub fn path(&self) -> Option<&str> {
        match self {
            AstNode::Record(record) => Some(&record.path),
            AstNode::Class(class) => Some(&class.path),
            _ => None,
        }
    }
}

/// A named record definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub path: String,
    pub type_literal: TypeLiteralStruct,
}

/// The shape of a record: fields in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeLiteralStruct {
    pub properties: Vec<StructProperty>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructProperty {
    pub name: String,
    pub ty: AstNode,
    pub optional: bool,
}

/// The exposed service class.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: String,
    pub path: String,
    pub doc: Option<String>,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub doc: Option<String>,
    pub return_type: AstNode,
    pub params: Vec<Param>,
}

impl Method {
    pub fn kind(&self) -> NodeKind {
        NodeKind::MethodDefinition
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: AstNode,
    pub optional: bool,
}

impl Param {
    pub fn kind(&self) -> NodeKind {
        NodeKind::ParameterDefinition
    }
}
