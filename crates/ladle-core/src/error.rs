//! Error types for loading, interpolating and planning.

use std::path::PathBuf;

/// A ladlefile could not be parsed.
///
/// `line` is 1-based and points at the offending declaration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

/// Why a declaration was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("recipe `{name}` is already defined on line {first}")]
    DuplicateRecipe { name: String, first: usize },

    #[error("malformed parameter list: {0}")]
    MalformedParameters(String),

    #[error("variadic parameter `{name}` must be the last parameter")]
    VariadicNotLast { name: String },

    #[error("parameter `{name}` is declared more than once")]
    DuplicateParameter { name: String },

    #[error("attribute `{attribute}` must be followed by a recipe")]
    DanglingAttribute { attribute: String },

    #[error("unknown attribute `{0}`")]
    UnknownAttribute(String),

    #[error("unknown setting `{0}`")]
    UnknownSetting(String),

    #[error(transparent)]
    DuplicateVariable(#[from] VariableError),

    #[error("malformed value: {0}")]
    MalformedValue(String),

    #[error("indented line outside of a recipe body")]
    UnexpectedIndent,

    #[error("recipe `{recipe}` depends on unknown recipe `{dependency}`")]
    UnknownDependency { recipe: String, dependency: String },

    #[error("{0}")]
    Syntax(String),
}

/// Failure to read and parse a ladlefile from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// Conflicting variable declaration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("variable `{name}` is already defined as {existing:?}, cannot redefine it as {conflicting:?}")]
pub struct VariableError {
    pub name: String,
    pub existing: String,
    pub conflicting: String,
}

/// Placeholder expansion failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterpolateError {
    #[error("unresolved placeholder `{name}`: no parameter or variable with that name")]
    UnresolvedPlaceholder { name: String },

    #[error("unterminated placeholder starting at column {column}")]
    Unterminated { column: usize },

    #[error("invalid placeholder `{text}`: expected an identifier")]
    InvalidPlaceholder { text: String },
}

/// Dependency planning failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("{}", describe_unknown(.name, .referenced_by.as_deref()))]
    UnknownRecipe {
        name: String,
        referenced_by: Option<String>,
    },

    #[error("dependency cycle detected: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },
}

fn describe_unknown(name: &str, referenced_by: Option<&str>) -> String {
    match referenced_by {
        Some(parent) => format!("recipe `{parent}` depends on unknown recipe `{name}`"),
        None => format!("unknown recipe `{name}`"),
    }
}
