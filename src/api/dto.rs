use serde::{Deserialize, Serialize};

use crate::domain::ast::{AstNode, BuiltInKind, Class, Method, Param, Record, StructProperty, TypeLiteralStruct};
use crate::domain::error::ExtractError;
use crate::domain::program::Program;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDto {
    pub body: Vec<NodeDto>,
}

/// Wire form of a node, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeDto {
    StringLiteral,
    IntLiteral,
    BoolLiteral,
    FloatLiteral,
    VoidLiteral,
    AnyLiteral,
    CustomNodeLiteral {
        name: String,
    },
    ArrayType {
        generic: Box<NodeDto>,
    },
    MapType {
        #[serde(rename = "genericKey")]
        generic_key: Box<NodeDto>,
        #[serde(rename = "genericValue")]
        generic_value: Box<NodeDto>,
    },
    TypeLiteral {
        properties: Vec<PropertyDto>,
    },
    StructLiteral {
        name: String,
        path: String,
        #[serde(rename = "typeLiteral")]
        type_literal: TypeLiteralDto,
    },
    ClassDefinition {
        name: String,
        path: String,
        #[serde(rename = "docString", default, skip_serializing_if = "Option::is_none")]
        doc_string: Option<String>,
        methods: Vec<MethodDto>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeLiteralTag {
    TypeLiteral,
}

/// Record shape; carries its own `type` tag like every other node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeLiteralDto {
    #[serde(rename = "type")]
    pub tag: TypeLiteralTag,
    pub properties: Vec<PropertyDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDto {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: NodeDto,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDto {
    pub name: String,
    pub params: Vec<ParamDto>,
    #[serde(rename = "returnType")]
    pub return_type: NodeDto,
    #[serde(rename = "docString", default, skip_serializing_if = "Option::is_none")]
    pub doc_string: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDto {
    pub name: String,
    #[serde(rename = "paramType")]
    pub param_type: NodeDto,
    pub optional: bool,
}

/// `{"error": ..., "file": ..., "line": ..., "column": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDto {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl ErrorDto {
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            file: None,
            line: None,
            column: None,
        }
    }
}

/// Outcome of one extraction as written to the output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseDto {
    Program(ProgramDto),
    Error(ErrorDto),
}

impl ResponseDto {
    pub fn is_error(&self) -> bool {
        matches!(self, ResponseDto::Error(_))
    }
}

/// One entry of a batch run, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntryDto {
    pub input: String,
    #[serde(flatten)]
    pub result: ResponseDto,
}

impl From<&ExtractError> for ErrorDto {
    fn from(err: &ExtractError) -> Self {
        let position = err.position.as_ref();
        ErrorDto {
            error: err.to_string(),
            file: position.map(|p| p.file.clone()),
            line: position.map(|p| p.line),
            column: position.map(|p| p.column),
        }
    }
}

impl From<&Program> for ProgramDto {
    fn from(program: &Program) -> Self {
        ProgramDto {
            body: program.body().iter().map(NodeDto::from).collect(),
        }
    }
}

impl From<Program> for ProgramDto {
    fn from(program: Program) -> Self {
        ProgramDto::from(&program)
    }
}

impl From<&AstNode> for NodeDto {
    fn from(node: &AstNode) -> Self {
        match node {
            AstNode::BuiltIn(kind) => match kind {
                BuiltInKind::String => NodeDto::StringLiteral,
                BuiltInKind::Integer => NodeDto::IntLiteral,
                BuiltInKind::Boolean => NodeDto::BoolLiteral,
                BuiltInKind::Float => NodeDto::FloatLiteral,
                BuiltInKind::Void => NodeDto::VoidLiteral,
                BuiltInKind::Any => NodeDto::AnyLiteral,
            },
            AstNode::Custom { name } => NodeDto::CustomNodeLiteral { name: name.clone() },
            AstNode::Array { element } => NodeDto::ArrayType {
                generic: Box::new(NodeDto::from(element.as_ref())),
            },
            AstNode::Map { key, value } => NodeDto::MapType {
                generic_key: Box::new(NodeDto::from(key.as_ref())),
                generic_value: Box::new(NodeDto::from(value.as_ref())),
            },
            AstNode::TypeLiteral(literal) => NodeDto::TypeLiteral {
                properties: properties(literal),
            },
            AstNode::Record(record) => record_dto(record),
            AstNode::Class(class) => class_dto(class),
        }
    }
}

fn properties(literal: &TypeLiteralStruct) -> Vec<PropertyDto> {
    literal.properties.iter().map(PropertyDto::from).collect()
}

fn record_dto(record: &Record) -> NodeDto {
    NodeDto::StructLiteral {
        name: record.name.clone(),
        path: record.path.clone(),
        type_literal: TypeLiteralDto {
            tag: TypeLiteralTag::TypeLiteral,
            properties: properties(&record.type_literal),
        },
    }
}

fn class_dto(class: &Class) -> NodeDto {
    NodeDto::ClassDefinition {
        name: class.name.clone(),
        path: class.path.clone(),
        doc_string: class.doc.clone(),
        methods: class.methods.iter().map(MethodDto::from).collect(),
    }
}

impl From<&StructProperty> for PropertyDto {
    fn from(property: &StructProperty) -> Self {
        PropertyDto {
            name: property.name.clone(),
            ty: NodeDto::from(&property.ty),
            optional: property.optional,
        }
    }
}

impl From<&Method> for MethodDto {
    fn from(method: &Method) -> Self {
        MethodDto {
            name: method.name.clone(),
            params: method.params.iter().map(ParamDto::from).collect(),
            return_type: NodeDto::from(&method.return_type),
            doc_string: method.doc.clone(),
        }
    }
}

impl From<&Param> for ParamDto {
    fn from(param: &Param) -> Self {
        ParamDto {
            name: param.name.clone(),
            param_type: NodeDto::from(&param.ty),
            optional: param.optional,
        }
    }
}
