//! Error types for toolpath parsing.

use thiserror::Error;

/// G-Code error type
///
/// Raised while reading a toolpath line. Callers reading sliced toolpaths
/// treat every variant as recoverable and skip the line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GcodeError {
    /// Invalid G-Code syntax
    #[error("Invalid syntax at line {line_number}: {reason}")]
    InvalidSyntax {
        /// The line number where the syntax error occurred.
        line_number: usize,
        /// The reason for the syntax error.
        reason: String,
    },

    /// Line holds nothing but whitespace or comments
    #[error("Empty line {line_number}")]
    EmptyLine {
        /// The line number of the empty line.
        line_number: usize,
    },

    /// Word letter is not a G-code address
    #[error("Unsupported word '{word}' at line {line_number}")]
    UnsupportedWord {
        /// The line number where the word was found.
        line_number: usize,
        /// The offending word.
        word: String,
    },
}

impl GcodeError {
    /// Line number the error refers to
    pub fn line_number(&self) -> usize {
        match self {
            Self::InvalidSyntax { line_number, .. }
            | Self::EmptyLine { line_number }
            | Self::UnsupportedWord { line_number, .. } => *line_number,
        }
    }
}

/// Result type alias for parsing operations.
pub type GcodeResult<T> = Result<T, GcodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcode_error_display() {
        let err = GcodeError::InvalidSyntax {
            line_number: 12,
            reason: "dangling 'X'".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid syntax at line 12: dangling 'X'");

        let err = GcodeError::EmptyLine { line_number: 3 };
        assert_eq!(err.to_string(), "Empty line 3");

        let err = GcodeError::UnsupportedWord {
            line_number: 7,
            word: "$H".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported word '$H' at line 7");
        assert_eq!(err.line_number(), 7);
    }
}
