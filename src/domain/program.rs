//! Program assembly.
//!
//! The body is append-only and insertion ordered: the class first, then
//! record definitions in the order they were first met. The set of
//! `(name, path)` pairs doubles as the dedup registry for the normalizer, so
//! same-named types from different packages stay distinct.

use std::collections::HashMap;

use super::ast::{AstNode, Class, Method, Record, TypeLiteralStruct};

/// Handle to a record appended before its fields were known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSlot(usize);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    body: Vec<AstNode>,
    /// name -> paths it is defined under
    defined: HashMap<String, Vec<String>>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a top-level node and registers its name and path.
    pub fn push(&mut self, node: AstNode) {
        if let (Some(name), Some(path)) = (node.name(), node.path()) {
            self.defined
                .entry(name.to_string())
                .or_default()
                .push(path.to_string());
        }
        self.body.push(node);
    }

    /// True when a top-level node with this name and path exists.
    pub fn is_defined(&self, name: &str, path: &str) -> bool {
        self.defined
            .get(name)
            .is_some_and(|paths| paths.iter().any(|p| p == path))
    }

    /// Registers `name` and appends an empty record for it, so recursive
    /// references met while filling it resolve to the same definition.
    pub fn reserve_record(&mut self, name: &str, path: &str) -> RecordSlot {
        self.push(AstNode::Record(Record {
            name: name.to_string(),
            path: path.to_string(),
            type_literal: TypeLiteralStruct::default(),
        }));
        RecordSlot(self.body.len() - 1)
    }

    pub fn fill_record(&mut self, slot: RecordSlot, literal: TypeLiteralStruct) {
        if let Some(AstNode::Record(record)) = self.body.get_mut(slot.0) {
            record.type_literal = literal;
        }
    }

    /// Appends a method to the class at the head of the body. Without a
    /// class there is nothing to attach to and the method is dropped.
    pub fn push_method(&mut self, method: Method) {
        if let Some(AstNode::Class(class)) = self.body.first_mut() {
            class.methods.push(method);
        }
    }

    pub fn class(&self) -> Option<&Class> {
        match self.body.first() {
            Some(AstNode::Class(class)) => Some(class),
            _ => None,
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.body.iter().filter_map(|node| match node {
            AstNode::Record(record) => Some(record),
            _ => None,
        })
    }

    pub fn record(&self, name: &str) -> Option<&Record> {
        self.records().find(|r| r.name == name)
    }

    pub fn body(&self) -> &[AstNode] {
        &self.body
    }

    pub fn into_body(self) -> Vec<AstNode> {
        self.body
    }
}
