//! The variable store: values declared with `name := "value"` and
//! `export name := "value"`.
//!
//! The store is built once while parsing and passed by reference to the
//! interpolator and the executor. Exported entries are added to the
//! environment of every shell invocation.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::VariableError;

/// A declared variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    pub name: String,
    pub value: String,
    pub exported: bool,
}

/// Variables in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableStore {
    vars: Vec<Variable>,
    index: HashMap<String, usize>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an exported variable.
    pub fn export(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), VariableError> {
        self.insert(Variable {
            name: name.into(),
            value: value.into(),
            exported: true,
        })
    }

    /// Register a variable visible to interpolation only.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), VariableError> {
        self.insert(Variable {
            name: name.into(),
            value: value.into(),
            exported: false,
        })
    }

    /// Re-declaring a name with an identical value is accepted; if either
    /// declaration exported it, the variable stays exported.
    pub fn insert(&mut self, var: Variable) -> Result<(), VariableError> {
        if let Some(&pos) = self.index.get(&var.name) {
            let existing = &mut self.vars[pos];
            if existing.value != var.value {
                return Err(VariableError {
                    name: var.name,
                    existing: existing.value.clone(),
                    conflicting: var.value,
                });
            }
            existing.exported |= var.exported;
            return Ok(());
        }
        self.index.insert(var.name.clone(), self.vars.len());
        self.vars.push(var);
        Ok(())
    }

    /// Look up a value. `None` means the name was never declared, which is
    /// not the same as a declared empty value.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.get(name).map(|v| v.value.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.index.get(name).map(|&pos| &self.vars[pos])
    }

    /// `(name, value)` pairs destined for the shell environment.
    pub fn exported(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars
            .iter()
            .filter(|v| v.exported)
            .map(|v| (v.name.as_str(), v.value.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
