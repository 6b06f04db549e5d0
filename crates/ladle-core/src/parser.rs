//! Ladlefile parsing.
//!
//! The format is line oriented:
//!
//! ```text
//! set shell := ["bash", "-cu"]
//! export RUST_LOG := "info"
//! profile := "debug"
//!
//! # Build the workspace
//! build target="debug" *flags: fmt
//!     cargo build --profile {{target}} {{flags}}
//!
//! [private]
//! fmt:
//!     @cargo fmt --all
//! ```
//!
//! A recipe body is every indented line directly under the header. Comments
//! at column 0 immediately above a recipe (or its attributes) become its doc.

use std::path::Path;

use tracing::debug;

use crate::error::{LoadError, ParseError, ParseErrorKind};
use crate::interpolate::is_identifier;
use crate::types::{Attribute, BodyLine, Ladlefile, Parameter, Platform, Recipe};

/// Parse a ladlefile for the current platform.
pub fn parse(text: &str) -> Result<Ladlefile, ParseError> {
    parse_for(text, Platform::current())
}

/// Parse a ladlefile as if running on `platform`.
pub fn parse_for(text: &str, platform: Platform) -> Result<Ladlefile, ParseError> {
    Parser::new(platform).run(text)
}

/// Read and parse a ladlefile from disk.
pub fn load(path: &Path) -> Result<Ladlefile, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut ladlefile = parse(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    ladlefile.path = Some(path.to_path_buf());
    debug!(
        path = %path.display(),
        recipes = ladlefile.recipes.len(),
        variables = ladlefile.variables.len(),
        "loaded ladlefile"
    );
    Ok(ladlefile)
}

/// A recipe whose body is still being read.
struct OpenRecipe {
    recipe: Recipe,
    /// Indentation of the first body line, stripped from the following ones.
    indent: Option<String>,
}

struct Parser {
    platform: Platform,
    file: Ladlefile,
    current: Option<OpenRecipe>,
    doc: Option<String>,
    attributes: Vec<(Attribute, usize)>,
    doc_attribute: Option<(String, usize)>,
}

impl Parser {
    fn new(platform: Platform) -> Self {
        Self {
            platform,
            file: Ladlefile::default(),
            current: None,
            doc: None,
            attributes: Vec::new(),
            doc_attribute: None,
        }
    }

    fn run(mut self, text: &str) -> Result<Ladlefile, ParseError> {
        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let raw = raw.strip_suffix('\r').unwrap_or(raw);
            self.line(raw, line)?;
        }
        self.close_recipe()?;
        self.check_dangling_attributes()?;
        self.check_prerequisites()?;
        Ok(self.file)
    }

    fn line(&mut self, raw: &str, line: usize) -> Result<(), ParseError> {
        let indented = raw.starts_with([' ', '\t']);
        let content = raw.trim();

        if content.is_empty() {
            if self.current.is_none() {
                self.doc = None;
            }
            return Ok(());
        }

        if indented {
            return match self.current.as_mut() {
                Some(open) => {
                    open.push_body(raw, line);
                    Ok(())
                }
                None => Err(ParseError::new(line, ParseErrorKind::UnexpectedIndent)),
            };
        }

        self.close_recipe()?;

        if let Some(comment) = content.strip_prefix('#') {
            let comment = comment.trim();
            self.doc = (!comment.is_empty() && !comment.starts_with('!'))
                .then(|| comment.to_string());
            return Ok(());
        }

        if content.starts_with('[') {
            return self.attribute_line(content, line);
        }

        if let Some(rest) = keyword(content, "set") {
            self.check_dangling_attributes()?;
            self.doc = None;
            return self.setting(rest, line);
        }

        if let Some(rest) = keyword(content, "export") {
            self.check_dangling_attributes()?;
            self.doc = None;
            let (name, value) = assignment(rest, line)?;
            return self
                .file
                .variables
                .export(name, value)
                .map_err(|e| ParseError::new(line, e.into()));
        }

        if is_assignment(content) {
            self.check_dangling_attributes()?;
            self.doc = None;
            let (name, value) = assignment(content, line)?;
            return self
                .file
                .variables
                .define(name, value)
                .map_err(|e| ParseError::new(line, e.into()));
        }

        self.header(content, line)
    }

    fn attribute_line(&mut self, content: &str, line: usize) -> Result<(), ParseError> {
        let mut cur = Cursor::new(content);
        cur.expect('[').map_err(|m| syntax(line, m))?;
        loop {
            cur.skip_ws();
            let name = cur
                .identifier()
                .ok_or_else(|| syntax(line, "expected attribute name"))?;
            cur.skip_ws();
            if name == "doc" {
                cur.expect('(').map_err(|m| syntax(line, m))?;
                cur.skip_ws();
                let text = cur
                    .string()
                    .map_err(|m| ParseError::new(line, ParseErrorKind::MalformedValue(m)))?;
                cur.skip_ws();
                cur.expect(')').map_err(|m| syntax(line, m))?;
                self.doc_attribute = Some((text, line));
            } else {
                let attr = Attribute::from_name(name).ok_or_else(|| {
                    ParseError::new(line, ParseErrorKind::UnknownAttribute(name.to_string()))
                })?;
                self.attributes.push((attr, line));
            }
            cur.skip_ws();
            if cur.eat(',') {
                continue;
            }
            cur.expect(']').map_err(|m| syntax(line, m))?;
            break;
        }
        cur.end_of_line().map_err(|m| syntax(line, m))
    }

    fn setting(&mut self, rest: &str, line: usize) -> Result<(), ParseError> {
        let mut cur = Cursor::new(rest);
        let name = cur
            .identifier()
            .ok_or_else(|| syntax(line, "expected setting name"))?;
        let slot = match name {
            "shell" => &mut self.file.settings.shell,
            "windows-shell" => &mut self.file.settings.windows_shell,
            other => {
                return Err(ParseError::new(
                    line,
                    ParseErrorKind::UnknownSetting(other.to_string()),
                ));
            }
        };
        cur.skip_ws();
        cur.expect_str(":=").map_err(|m| syntax(line, m))?;
        cur.skip_ws();
        let list = cur
            .string_list()
            .map_err(|m| ParseError::new(line, ParseErrorKind::MalformedValue(m)))?;
        if list.is_empty() {
            return Err(ParseError::new(
                line,
                ParseErrorKind::MalformedValue(format!("`{name}` needs at least a program")),
            ));
        }
        cur.end_of_line().map_err(|m| syntax(line, m))?;
        *slot = Some(list);
        Ok(())
    }

    fn header(&mut self, content: &str, line: usize) -> Result<(), ParseError> {
        let mut cur = Cursor::new(content);
        let quiet = cur.eat('@');
        let name = cur
            .identifier()
            .ok_or_else(|| syntax(line, format!("expected recipe name, found `{content}`")))?
            .to_string();

        let mut recipe = Recipe::new(name, line);
        recipe.quiet = quiet;
        recipe.parameters = parameters(&mut cur, line)?;

        cur.skip_ws();
        cur.expect(':').map_err(|m| syntax(line, m))?;
        loop {
            cur.skip_ws();
            if cur.at_end() || cur.peek() == Some('#') {
                break;
            }
            let dep = cur.identifier().ok_or_else(|| {
                syntax(line, format!("expected prerequisite name at column {}", cur.column()))
            })?;
            recipe.prerequisites.push(dep.to_string());
        }

        recipe.attributes = self.attributes.drain(..).map(|(a, _)| a).collect();
        recipe.doc = self
            .doc_attribute
            .take()
            .map(|(text, _)| text)
            .or_else(|| self.doc.take());
        self.doc = None;
        self.current = Some(OpenRecipe {
            recipe,
            indent: None,
        });
        Ok(())
    }

    fn close_recipe(&mut self) -> Result<(), ParseError> {
        let Some(open) = self.current.take() else {
            return Ok(());
        };
        let recipe = open.recipe;
        if !recipe.enabled_on(self.platform) {
            debug!(recipe = %recipe.name, platform = ?self.platform, "recipe disabled on this platform");
            return Ok(());
        }
        let name = recipe.name.clone();
        let line = recipe.line;
        self.file.recipes.insert(recipe).map_err(|existing| {
            ParseError::new(
                line,
                ParseErrorKind::DuplicateRecipe {
                    name,
                    first: existing.line,
                },
            )
        })
    }

    fn check_dangling_attributes(&self) -> Result<(), ParseError> {
        match self.attributes.first() {
            Some((attr, line)) => Err(ParseError::new(
                *line,
                ParseErrorKind::DanglingAttribute {
                    attribute: attr.to_string(),
                },
            )),
            None => match &self.doc_attribute {
                Some((_, line)) => Err(ParseError::new(
                    *line,
                    ParseErrorKind::DanglingAttribute {
                        attribute: "doc".to_string(),
                    },
                )),
                None => Ok(()),
            },
        }
    }

    fn check_prerequisites(&self) -> Result<(), ParseError> {
        for recipe in self.file.recipes.iter() {
            for dep in &recipe.prerequisites {
                if !self.file.recipes.contains(dep) {
                    return Err(ParseError::new(
                        recipe.line,
                        ParseErrorKind::UnknownDependency {
                            recipe: recipe.name.clone(),
                            dependency: dep.clone(),
                        },
                    ));
                }
            }
        }
        Ok(())
    }
}

impl OpenRecipe {
    fn push_body(&mut self, raw: &str, line: usize) {
        let indent = self.indent.get_or_insert_with(|| {
            let width = raw.len() - raw.trim_start().len();
            raw[..width].to_string()
        });
        let text = raw.strip_prefix(indent.as_str()).unwrap_or(raw.trim_start());
        let (quiet, text) = match text.strip_prefix('@') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        self.recipe.body.push(BodyLine {
            text: text.to_string(),
            line,
            quiet,
        });
    }
}

/// Parse `[$][*]name[=value]` items until the `:` that ends the header.
fn parameters(cur: &mut Cursor<'_>, line: usize) -> Result<Vec<Parameter>, ParseError> {
    let mut params: Vec<Parameter> = Vec::new();
    loop {
        cur.skip_ws();
        if cur.at_end() || cur.peek() == Some(':') {
            break;
        }

        let mut param = Parameter::new(String::new());
        while let Some(c @ ('*' | '$')) = cur.peek() {
            cur.bump();
            if c == '*' {
                param.variadic = true;
            } else {
                param.export = true;
            }
        }
        let name = cur.identifier().ok_or_else(|| {
            malformed(line, format!("expected parameter name at column {}", cur.column()))
        })?;
        param.name = name.to_string();

        cur.skip_ws();
        if cur.eat('=') {
            cur.skip_ws();
            let value = cur.string().map_err(|m| {
                malformed(line, format!("default for `{}`: {m}", param.name))
            })?;
            param.default = Some(value);
        }

        if params.iter().any(|p| p.name == param.name) {
            return Err(ParseError::new(
                line,
                ParseErrorKind::DuplicateParameter { name: param.name },
            ));
        }
        if let Some(prev) = params.last() {
            if prev.variadic {
                return Err(ParseError::new(
                    line,
                    ParseErrorKind::VariadicNotLast {
                        name: prev.name.clone(),
                    },
                ));
            }
            if prev.default.is_some() && param.is_required() {
                return Err(malformed(
                    line,
                    format!(
                        "required parameter `{}` follows parameter `{}` which has a default",
                        param.name, prev.name
                    ),
                ));
            }
        }
        params.push(param);
    }
    Ok(params)
}

/// Split `name := "value"`.
fn assignment(content: &str, line: usize) -> Result<(String, String), ParseError> {
    let mut cur = Cursor::new(content);
    let name = cur
        .identifier()
        .ok_or_else(|| syntax(line, "expected variable name"))?
        .to_string();
    cur.skip_ws();
    cur.expect_str(":=").map_err(|m| syntax(line, m))?;
    cur.skip_ws();
    let value = cur
        .string()
        .map_err(|m| ParseError::new(line, ParseErrorKind::MalformedValue(m)))?;
    cur.end_of_line().map_err(|m| syntax(line, m))?;
    Ok((name, value))
}

/// Render `value` as a double-quoted string that [`parse`] reads back
/// unchanged. Only the escapes the string grammar knows are produced; any
/// other character is written as is.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn is_assignment(content: &str) -> bool {
    let mut cur = Cursor::new(content);
    if cur.identifier().is_none() {
        return false;
    }
    cur.skip_ws();
    cur.rest().starts_with(":=")
}

/// `content` starts with `word` followed by whitespace.
fn keyword<'a>(content: &'a str, word: &str) -> Option<&'a str> {
    let rest = content.strip_prefix(word)?;
    rest.starts_with([' ', '\t']).then(|| rest.trim_start())
}

fn syntax(line: usize, message: impl Into<String>) -> ParseError {
    ParseError::new(line, ParseErrorKind::Syntax(message.into()))
}

fn malformed(line: usize, message: impl Into<String>) -> ParseError {
    ParseError::new(line, ParseErrorKind::MalformedParameters(message.into()))
}

/// Character cursor over a single line.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// 1-based column of the cursor.
    fn column(&self) -> usize {
        self.src[..self.pos].chars().count() + 1
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), String> {
        if self.eat(c) {
            return Ok(());
        }
        Err(match self.peek() {
            Some(found) => format!("expected `{c}` at column {}, found `{found}`", self.column()),
            None => format!("expected `{c}` at end of line"),
        })
    }

    fn expect_str(&mut self, s: &str) -> Result<(), String> {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            Ok(())
        } else {
            Err(format!("expected `{s}` at column {}", self.column()))
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.pos += 1;
        }
    }

    /// Only whitespace or a `#` comment may remain.
    fn end_of_line(&mut self) -> Result<(), String> {
        self.skip_ws();
        match self.peek() {
            None | Some('#') => Ok(()),
            Some(c) => Err(format!("unexpected `{c}` at column {}", self.column())),
        }
    }

    fn identifier(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(i, c)| {
                let ok = if i == 0 {
                    c.is_ascii_alphabetic() || c == '_'
                } else {
                    c.is_ascii_alphanumeric() || c == '_' || c == '-'
                };
                !ok
            })
            .map_or(rest.len(), |(i, _)| i);
        if len == 0 {
            return None;
        }
        let ident = &rest[..len];
        debug_assert!(is_identifier(ident));
        self.pos += len;
        Some(ident)
    }

    /// A `"double"` (with `\n \t \" \\` escapes) or `'single'` (raw) string.
    fn string(&mut self) -> Result<String, String> {
        let column = self.column();
        match self.bump() {
            Some('\'') => {
                let rest = self.rest();
                let end = rest
                    .find('\'')
                    .ok_or_else(|| format!("unterminated string starting at column {column}"))?;
                self.pos += end + 1;
                Ok(rest[..end].to_string())
            }
            Some('"') => {
                let mut out = String::new();
                loop {
                    match self.bump() {
                        None => {
                            return Err(format!(
                                "unterminated string starting at column {column}"
                            ));
                        }
                        Some('"') => return Ok(out),
                        Some('\\') => match self.bump() {
                            Some('n') => out.push('\n'),
                            Some('t') => out.push('\t'),
                            Some('r') => out.push('\r'),
                            Some('"') => out.push('"'),
                            Some('\\') => out.push('\\'),
                            Some(other) => {
                                return Err(format!("unknown escape `\\{other}`"));
                            }
                            None => {
                                return Err(format!(
                                    "unterminated string starting at column {column}"
                                ));
                            }
                        },
                        Some(c) => out.push(c),
                    }
                }
            }
            _ => Err(format!("expected a quoted string at column {column}")),
        }
    }

    /// `["a", 'b', ...]`
    fn string_list(&mut self) -> Result<Vec<String>, String> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(']') {
                return Ok(items);
            }
            items.push(self.string()?);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            self.expect(']')?;
            return Ok(items);
        }
    }
}
