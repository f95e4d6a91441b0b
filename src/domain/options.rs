//! Extraction options, read from the `[extract]` config table or set by CLI
//! flags.

use serde::{Deserialize, Serialize};

/// What to do with types that have no AST counterpart (interfaces, funcs,
/// channels, complex numbers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnrepresentablePolicy {
    /// Map them to `AnyLiteral`.
    #[default]
    Any,
    /// Fail with `InvalidType`.
    Error,
}

/// Knobs of the extraction core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExtractOptions {
    /// Name of the package-level constructor function.
    pub constructor_name: String,
    pub unrepresentable: UnrepresentablePolicy,
    /// Only expose methods whose name starts with an uppercase letter.
    pub exported_only: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            constructor_name: "New".to_string(),
            unrepresentable: UnrepresentablePolicy::Any,
            exported_only: false,
        }
    }
}

impl ExtractOptions {
    pub fn strict() -> Self {
        Self {
            unrepresentable: UnrepresentablePolicy::Error,
            ..Self::default()
        }
    }
}

pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
