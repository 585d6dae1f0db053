//! Attempt-local variable namespace for script execution

use std::collections::HashMap;

use crate::script::{StyleSpec, WorkbookModel};

/// Value bound to a name in the namespace
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Workbook(WorkbookModel),
    Style(StyleSpec),
    Buffer(Vec<u8>),
}

impl Binding {
    pub fn kind(&self) -> &'static str {
        match self {
            Binding::Workbook(_) => "a workbook",
            Binding::Style(_) => "a style",
            Binding::Buffer(_) => "a saved buffer",
        }
    }
}

/// Names bound by one script run. Created fresh for every execution.
#[derive(Debug, Default)]
pub struct Namespace {
    bindings: HashMap<String, Binding>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: Binding) {
        self.bindings.insert(name.into(), value);
    }

    pub fn workbook_mut(&mut self, name: &str) -> Result<&mut WorkbookModel, String> {
        match self.bindings.get_mut(name) {
            Some(Binding::Workbook(wb)) => Ok(wb),
            Some(other) => Err(format!("'{}' is {}, not a workbook", name, other.kind())),
            None => Err(format!("name '{}' is not defined; create it with `workbook {}`", name, name)),
        }
    }

    pub fn workbook(&self, name: &str) -> Result<&WorkbookModel, String> {
        match self.bindings.get(name) {
            Some(Binding::Workbook(wb)) => Ok(wb),
            Some(other) => Err(format!("'{}' is {}, not a workbook", name, other.kind())),
            None => Err(format!("name '{}' is not defined; create it with `workbook {}`", name, name)),
        }
    }

    pub fn style(&self, name: &str) -> Result<&StyleSpec, String> {
        match self.bindings.get(name) {
            Some(Binding::Style(spec)) => Ok(spec),
            Some(other) => Err(format!("'{}' is {}, not a style", name, other.kind())),
            None => Err(format!("style '{}' is not defined; add `style {} ...` first", name, name)),
        }
    }

    /// Take a saved buffer out of the namespace
    pub fn take_buffer(&mut self, name: &str) -> Option<Result<Vec<u8>, &'static str>> {
        match self.bindings.remove(name)? {
            Binding::Buffer(bytes) => Some(Ok(bytes)),
            other => Some(Err(other.kind())),
        }
    }
}
