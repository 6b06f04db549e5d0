//! Ladlefile data model: recipes, parameters, attributes and settings.
//!
//! Everything here is built once by the parser and then only read.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::variables::VariableStore;

/// A recipe parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,

    /// Value used when no argument is supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Absorbs every remaining positional argument (`*name`).
    pub variadic: bool,

    /// Exported to the recipe's shell environment (`$name`).
    pub export: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            variadic: false,
            export: false,
        }
    }

    /// A parameter is required when it has no default and is not variadic.
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.variadic
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variadic {
            write!(f, "*")?;
        }
        if self.export {
            write!(f, "$")?;
        }
        write!(f, "{}", self.name)?;
        if let Some(ref default) = self.default {
            write!(f, "={}", crate::parser::quote(default))?;
        }
        Ok(())
    }
}

/// Recipe attribute, written as `[name]` above the recipe header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    /// Hidden from listings, still invocable.
    Private,
    Linux,
    Macos,
    Unix,
    Windows,
}

impl Attribute {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "private" => Some(Self::Private),
            "linux" => Some(Self::Linux),
            "macos" => Some(Self::Macos),
            "unix" => Some(Self::Unix),
            "windows" => Some(Self::Windows),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::Unix => "unix",
            Self::Windows => "windows",
        }
    }

    /// Whether this attribute restricts the recipe to some platforms.
    pub fn is_os(&self) -> bool {
        !matches!(self, Self::Private)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating system family a ladlefile is loaded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Macos,
    /// Any other Unix (BSDs, illumos, ...).
    OtherUnix,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(target_os = "macos") {
            Self::Macos
        } else if cfg!(windows) {
            Self::Windows
        } else {
            Self::OtherUnix
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Self::Windows)
    }

    /// Whether an OS attribute enables a recipe on this platform.
    pub fn matches(&self, attribute: Attribute) -> bool {
        match attribute {
            Attribute::Private => true,
            Attribute::Linux => matches!(self, Self::Linux),
            Attribute::Macos => matches!(self, Self::Macos),
            Attribute::Unix => !self.is_windows(),
            Attribute::Windows => self.is_windows(),
        }
    }
}

/// One line of a recipe body, before interpolation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BodyLine {
    pub text: String,

    /// 1-based line number in the ladlefile.
    pub line: usize,

    /// Written with a leading `@`: not echoed before running.
    pub quiet: bool,
}

/// A named, parameterized group of shell lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipe {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,

    pub parameters: Vec<Parameter>,

    /// Recipes that run, in this order, before this one.
    pub prerequisites: Vec<String>,

    pub attributes: BTreeSet<Attribute>,

    /// Header written with a leading `@`: no line is echoed.
    pub quiet: bool,

    pub body: Vec<BodyLine>,

    /// 1-based line number of the header.
    pub line: usize,
}

impl Recipe {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            doc: None,
            parameters: Vec::new(),
            prerequisites: Vec::new(),
            attributes: BTreeSet::new(),
            quiet: false,
            body: Vec::new(),
            line,
        }
    }

    /// Private recipes are left out of listings. Names starting with `_`
    /// are private without the attribute.
    pub fn is_private(&self) -> bool {
        self.attributes.contains(&Attribute::Private) || self.name.starts_with('_')
    }

    pub fn variadic(&self) -> Option<&Parameter> {
        self.parameters.last().filter(|p| p.variadic)
    }

    /// Maximum positional arguments, `None` when a variadic is present.
    pub fn max_arguments(&self) -> Option<usize> {
        if self.variadic().is_some() {
            None
        } else {
            Some(self.parameters.len())
        }
    }

    /// Header without prerequisites, e.g. `build target="debug" *flags`.
    pub fn signature(&self) -> String {
        let mut sig = self.name.clone();
        for param in &self.parameters {
            sig.push(' ');
            sig.push_str(&param.to_string());
        }
        sig
    }

    /// Whether the recipe is enabled on `platform`. Recipes without OS
    /// attributes are enabled everywhere.
    pub fn enabled_on(&self, platform: Platform) -> bool {
        let mut os = self.attributes.iter().filter(|a| a.is_os()).peekable();
        if os.peek().is_none() {
            return true;
        }
        os.any(|a| platform.matches(*a))
    }
}

/// Recipes keyed by name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeTable {
    recipes: Vec<Recipe>,
    index: HashMap<String, usize>,
}

impl RecipeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a recipe; on a name clash the existing recipe is returned.
    pub fn insert(&mut self, recipe: Recipe) -> Result<(), &Recipe> {
        if let Some(&pos) = self.index.get(&recipe.name) {
            return Err(&self.recipes[pos]);
        }
        self.index.insert(recipe.name.clone(), self.recipes.len());
        self.recipes.push(recipe);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Recipe> {
        self.index.get(name).map(|&pos| &self.recipes[pos])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    /// Recipes shown by listings.
    pub fn public(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter().filter(|r| !r.is_private())
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

/// Document-level `set` options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// `set shell := [...]`: program followed by its arguments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<Vec<String>>,

    /// `set windows-shell := [...]`, preferred over `shell` on Windows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows_shell: Option<Vec<String>>,
}

/// A fully parsed ladlefile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ladlefile {
    pub recipes: RecipeTable,
    pub variables: VariableStore,
    pub settings: Settings,

    /// Where the document was read from, if it came from disk.
    pub path: Option<PathBuf>,
}

impl Ladlefile {
    /// Directory recipes run in by default.
    pub fn directory(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, default: Option<&str>, variadic: bool) -> Parameter {
        Parameter {
            name: name.into(),
            default: default.map(str::to_string),
            variadic,
            export: false,
        }
    }

    #[test]
    fn signature_renders_defaults_and_variadic() {
        let mut recipe = Recipe::new("build", 1);
        recipe.parameters = vec![
            param("target", Some("debug"), false),
            param("flags", None, true),
        ];
        assert_eq!(recipe.signature(), "build target=\"debug\" *flags");
        assert_eq!(recipe.max_arguments(), None);
    }

    #[test]
    fn underscore_names_are_private() {
        let recipe = Recipe::new("_helper", 1);
        assert!(recipe.is_private());
        let mut tagged = Recipe::new("helper", 2);
        assert!(!tagged.is_private());
        tagged.attributes.insert(Attribute::Private);
        assert!(tagged.is_private());
    }

    #[test]
    fn os_attributes_gate_platforms() {
        let mut recipe = Recipe::new("open", 1);
        assert!(recipe.enabled_on(Platform::Windows));

        recipe.attributes.insert(Attribute::Private);
        assert!(recipe.enabled_on(Platform::Windows));

        recipe.attributes.insert(Attribute::Unix);
        assert!(recipe.enabled_on(Platform::Linux));
        assert!(recipe.enabled_on(Platform::Macos));
        assert!(!recipe.enabled_on(Platform::Windows));

        let mut win = Recipe::new("open", 5);
        win.attributes.insert(Attribute::Windows);
        assert!(win.enabled_on(Platform::Windows));
        assert!(!win.enabled_on(Platform::OtherUnix));
    }

    #[test]
    fn table_rejects_duplicates_and_keeps_order() {
        let mut table = RecipeTable::new();
        table.insert(Recipe::new("b", 1)).unwrap();
        table.insert(Recipe::new("a", 3)).unwrap();
        let clash = table.insert(Recipe::new("b", 7)).unwrap_err();
        assert_eq!(clash.line, 1);
        let names: Vec<_> = table.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
