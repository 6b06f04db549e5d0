//! `{{name}}` placeholder expansion for recipe lines.
//!
//! A placeholder is resolved against the recipe's bound parameters first and
//! the variable store second. `{{{{` produces a literal `{{`; nothing else is
//! special. Expansion is a single literal pass.

use std::collections::BTreeMap;

use crate::error::InterpolateError;
use crate::variables::VariableStore;

/// Parameter values for one recipe in one plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingContext {
    values: BTreeMap<String, String>,
}

impl BindingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BindingContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Self::new();
        for (k, v) in iter {
            ctx.insert(k, v);
        }
        ctx
    }
}

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Expand every placeholder in `template`.
pub fn interpolate(
    template: &str,
    bindings: &BindingContext,
    variables: &VariableStore,
) -> Result<String, InterpolateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find(OPEN) {
        out.push_str(&rest[..open]);
        let after = &rest[open + OPEN.len()..];

        if let Some(escaped) = after.strip_prefix(OPEN) {
            out.push_str(OPEN);
            rest = escaped;
            continue;
        }

        let close = after.find(CLOSE).ok_or(InterpolateError::Unterminated {
            column: template.len() - rest.len() + open + 1,
        })?;
        let name = after[..close].trim();
        if !is_identifier(name) {
            return Err(InterpolateError::InvalidPlaceholder {
                text: after[..close].to_string(),
            });
        }

        let value = bindings
            .get(name)
            .or_else(|| variables.resolve(name))
            .ok_or_else(|| InterpolateError::UnresolvedPlaceholder {
                name: name.to_string(),
            })?;
        out.push_str(value);
        rest = &after[close + CLOSE.len()..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Identifiers referenced by `template`, in order of appearance, skipping
/// escapes and malformed placeholders.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find(OPEN) {
        let after = &rest[open + OPEN.len()..];
        if let Some(escaped) = after.strip_prefix(OPEN) {
            rest = escaped;
            continue;
        }
        let Some(close) = after.find(CLOSE) else {
            break;
        };
        let name = after[..close].trim();
        if is_identifier(name) {
            names.push(name);
        }
        rest = &after[close + CLOSE.len()..];
    }
    names
}

/// `[A-Za-z_][A-Za-z0-9_-]*`
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store(pairs: &[(&str, &str)]) -> VariableStore {
        let mut store = VariableStore::new();
        for (k, v) in pairs {
            store.export(*k, *v).unwrap();
        }
        store
    }

    #[test]
    fn bindings_then_variables() {
        let vars = store(&[("GREETING", "hi"), ("name", "shadowed")]);
        let bindings: BindingContext = [("name", "world")].into_iter().collect();
        let line = interpolate("echo {{GREETING}} {{name}}", &bindings, &vars).unwrap();
        assert_eq!(line, "echo hi world");
    }

    #[test]
    fn whitespace_inside_braces_is_ignored() {
        let bindings: BindingContext = [("target", "release")].into_iter().collect();
        let line = interpolate("cargo build --{{ target }}", &bindings, &VariableStore::new());
        assert_eq!(line.unwrap(), "cargo build --release");
    }

    #[test]
    fn unresolved_names_the_identifier() {
        let err = interpolate("echo {{nope}}", &BindingContext::new(), &VariableStore::new())
            .unwrap_err();
        assert_eq!(
            err,
            InterpolateError::UnresolvedPlaceholder {
                name: "nope".into()
            }
        );
    }

    #[test]
    fn empty_value_is_not_unresolved() {
        let bindings: BindingContext = [("args", "")].into_iter().collect();
        let line = interpolate("test {{args}}", &bindings, &VariableStore::new()).unwrap();
        assert_eq!(line, "test ");
    }

    #[test]
    fn quadruple_brace_escapes() {
        let line = interpolate(
            "echo '{{{{not a placeholder}}'",
            &BindingContext::new(),
            &VariableStore::new(),
        )
        .unwrap();
        assert_eq!(line, "echo '{{not a placeholder}}'");
    }

    #[test]
    fn unterminated_reports_column() {
        let err = interpolate("ab{{x", &BindingContext::new(), &VariableStore::new())
            .unwrap_err();
        assert_eq!(err, InterpolateError::Unterminated { column: 3 });
    }

    #[test]
    fn non_identifier_is_invalid() {
        let err = interpolate("{{ a b }}", &BindingContext::new(), &VariableStore::new())
            .unwrap_err();
        assert!(matches!(err, InterpolateError::InvalidPlaceholder { .. }));
    }

    #[test]
    fn lone_closing_braces_pass_through() {
        let line = interpolate("awk '{ print }}'", &BindingContext::new(), &VariableStore::new())
            .unwrap();
        assert_eq!(line, "awk '{ print }}'");
    }

    #[test]
    fn placeholders_lists_references() {
        assert_eq!(
            placeholders("{{a}} {{{{b}} {{ c }} {{"),
            vec!["a", "c"]
        );
    }

    #[test]
    fn identifier_rules() {
        assert!(is_identifier("RUST_LOG"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("dry-run"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a b"));
    }
}
