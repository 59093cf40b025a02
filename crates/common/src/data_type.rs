//! Data type names of IPPcode24 values.

use std::fmt;

/// The type of a value, as named by `type@...` operands and reported by
/// the `TYPE` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Int,
    Bool,
    String,
    Nil,
}

/// All data types, in definition order.
pub const ALL_DATA_TYPES: [DataType; 4] = [
    DataType::Int,
    DataType::Bool,
    DataType::String,
    DataType::Nil,
];

impl DataType {
    /// Returns the lower-case name used in source text.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Bool => "bool",
            DataType::String => "string",
            DataType::Nil => "nil",
        }
    }

    /// Look up a data type by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_DATA_TYPES
            .iter()
            .find(|ty| ty.name().eq_ignore_ascii_case(name))
            .copied()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip() {
        for &ty in &ALL_DATA_TYPES {
            assert_eq!(DataType::from_name(ty.name()), Some(ty));
        }
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(DataType::from_name("STRING"), Some(DataType::String));
        assert_eq!(DataType::from_name("Nil"), Some(DataType::Nil));
    }

    #[test]
    fn unknown_name() {
        assert_eq!(DataType::from_name("float"), None);
        assert_eq!(DataType::from_name(""), None);
    }
}
