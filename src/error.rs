use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum OptionsError {
    InvalidNumber(String),
    UnknownParameter(String),
    InvalidSelection(usize),
    FixedKdf,
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsError::InvalidNumber(t) => {
                write!(f, "'{t}' is not valid: entry must be a whole number")
            }
            OptionsError::UnknownParameter(n) => {
                write!(f, "parameter '{n}' is not part of the selected key derivation function")
            }
            OptionsError::InvalidSelection(i) => write!(f, "selection index {i} is out of range"),
            OptionsError::FixedKdf => {
                write!(f, "version 1.x databases have a fixed key derivation function")
            }
        }
    }
}

impl std::error::Error for OptionsError {}
