//! Schema compilation core.
//!
//! This module turns declarative table and statement definitions into
//! incremental DDL and compiled statements for a Spanner-style dialect:
//! - `schema::definition` / `schema::statement` - the serde input model
//! - `schema::types` - the type catalog (DDL, host and wire types)
//! - `schema::registry` - tables declared so far in a generation pass
//! - `schema::compilers` - DDL, expression and statement compilers
//!
//! # Errors
//!
//! Every compiler reports failures as [`CompileError`]. Errors are built from
//! the innermost failure outwards: the compiler that detects the problem
//! returns a root variant and each enclosing compiler prefixes a label with
//! [`ResultExt::context`], so the rendered message reads
//! `When generating GetItem, and when joining t, column x is not found in table Tag.`

pub mod schema;

use thiserror::Error;

/// Root categories of compile errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A required field is absent or empty.
    MissingField,
    /// A table, column, column group, search column or alias does not exist.
    UnresolvedReference,
    /// A reference exists but its type or shape is wrong for the use.
    InvalidShape,
    /// An operator, join type or mode is not one of the known values.
    UnknownEnumerant,
}

/// Compile error types
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("{field} is missing.")]
    MissingField { field: String },

    #[error("{what} {name} is not found{scope}.")]
    NotFound {
        what: &'static str,
        name: String,
        scope: String,
    },

    #[error("{message}")]
    Invalid { message: String },

    #[error("{what} {value} is not supported.")]
    Unsupported { what: &'static str, value: String },

    #[error("{context}, {source}")]
    Context {
        context: String,
        source: Box<CompileError>,
    },
}

impl CompileError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// `scope` is rendered verbatim after the name, e.g. `" in table Items"`.
    pub fn not_found(what: &'static str, name: impl Into<String>, scope: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            name: name.into(),
            scope: scope.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    pub fn unsupported(what: &'static str, value: impl Into<String>) -> Self {
        Self::Unsupported {
            what,
            value: value.into(),
        }
    }

    /// Returns the innermost error, skipping every context label.
    pub fn root(&self) -> &CompileError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingField { .. } => ErrorCategory::MissingField,
            Self::NotFound { .. } => ErrorCategory::UnresolvedReference,
            Self::Invalid { .. } => ErrorCategory::InvalidShape,
            Self::Unsupported { .. } => ErrorCategory::UnknownEnumerant,
            Self::Context { source, .. } => source.category(),
        }
    }
}

/// Prefixes context labels onto compile errors.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T, CompileError>;

    fn with_context<C, F>(self, f: F) -> Result<T, CompileError>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> ResultExt<T> for Result<T, CompileError> {
    fn context(self, context: impl Into<String>) -> Result<T, CompileError> {
        self.map_err(|source| CompileError::Context {
            context: context.into(),
            source: Box::new(source),
        })
    }

    fn with_context<C, F>(self, f: F) -> Result<T, CompileError>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|source| CompileError::Context {
            context: f().into(),
            source: Box::new(source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_context_chain_renders_outermost_first() {
        let result: Result<(), CompileError> =
            Err(CompileError::not_found("column", "y", " in table Z"));
        let err = result
            .context("and when joining X")
            .context("When generating GetItem")
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "When generating GetItem, and when joining X, column y is not found in table Z."
        );
    }

    #[rstest]
    #[case(CompileError::missing("where"), ErrorCategory::MissingField)]
    #[case(CompileError::not_found("table", "T", ""), ErrorCategory::UnresolvedReference)]
    #[case(CompileError::invalid("bad"), ErrorCategory::InvalidShape)]
    #[case(CompileError::unsupported("operator", "~"), ErrorCategory::UnknownEnumerant)]
    fn test_category_survives_context(#[case] err: CompileError, #[case] expected: ErrorCategory) {
        let wrapped = Err::<(), _>(err).context("When generating X").unwrap_err();
        assert_eq!(wrapped.category(), expected);
    }

    #[rstest]
    fn test_with_context_is_lazy() {
        let ok: Result<u8, CompileError> = Ok(1);
        let value = ok
            .with_context(|| -> String { panic!("context built for a successful result") })
            .unwrap();
        assert_eq!(value, 1);
    }
}
