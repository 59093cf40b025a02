//! Variable frames.

use crate::value::Value;

/// A named-variable container.
///
/// Variables keep their declaration order, which is the order diagnostics
/// list them in. Names are unique within a frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    variables: Vec<(String, Value)>,
}

impl Frame {
    /// Create an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an unassigned variable. Returns false if the name already
    /// exists, leaving the frame unchanged.
    pub fn declare(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.variables.push((name.to_string(), Value::Uninit));
        true
    }

    /// Returns true if `name` is declared in this frame.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The current value of a declared variable.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables
            .iter()
            .find(|(var, _)| var == name)
            .map(|(_, value)| value)
    }

    /// Assign a declared variable. Returns false if `name` is undeclared.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        match self.variables.iter_mut().find(|(var, _)| var == name) {
            Some((_, slot)) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Iterate over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.variables
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of declared variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns true if no variable is declared.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
