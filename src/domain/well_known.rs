//! Well-known external types.
//!
//! Some platform types are not expanded structurally. Each entry maps a
//! `(package path, type name)` pair to a fixed synthetic record that the
//! downstream generator treats as an ordinary injectable record.

use super::ast::{AstNode, BuiltInKind, Record, StructProperty, TypeLiteralStruct};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellKnownField {
    pub name: &'static str,
    pub ty: BuiltInKind,
    pub optional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellKnownType {
    pub package: &'static str,
    pub name: &'static str,
    pub record_name: &'static str,
    pub record_path: &'static str,
    pub fields: &'static [WellKnownField],
}

impl WellKnownType {
    /// The synthetic definition registered in the program.
    pub fn record(&self) -> Record {
        Record {
            name: self.record_name.to_string(),
            path: self.record_path.to_string(),
            type_literal: TypeLiteralStruct {
                properties: self
                    .fields
                    .iter()
                    .map(|f| StructProperty {
                        name: f.name.to_string(),
                        ty: AstNode::BuiltIn(f.ty),
                        optional: f.optional,
                    })
                    .collect(),
            },
        }
    }
}

pub const WELL_KNOWN_TYPES: &[WellKnownType] = &[WellKnownType {
    package: "context",
    name: "Context",
    record_name: "GnzContext",
    record_path: "context",
    fields: &[WellKnownField {
        name: "token",
        ty: BuiltInKind::String,
        optional: true,
    }],
}];

pub fn lookup(package: Option<&str>, name: &str) -> Option<&'static WellKnownType> {
    let package = package?;
    WELL_KNOWN_TYPES
        .iter()
        .find(|t| t.package == package && t.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_lookup() {
        let context = lookup(Some("context"), "Context").unwrap();
        assert_eq!(context.record_name, "GnzContext");

        let record = context.record();
        assert_eq!(record.path, "context");
        assert_eq!(record.type_literal.properties.len(), 1);
        let token = &record.type_literal.properties[0];
        assert_eq!(token.name, "token");
        assert_eq!(token.ty, AstNode::BuiltIn(BuiltInKind::String));
        assert!(token.optional);
    }

    #[test]
    fn test_lookup_requires_exact_package() {
        assert!(lookup(Some("example.com/context"), "Context").is_none());
        assert!(lookup(None, "Context").is_none());
        assert!(lookup(Some("context"), "CancelFunc").is_none());
    }
}
