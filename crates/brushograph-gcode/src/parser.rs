//! G-Code line parser
//!
//! Reads externally produced toolpaths (slicer output) one line at a time.
//! A line is stripped of comments and split into address words
//! (`G1`, `X10.5`, `F600`, ...). Anything that is not a word is a syntax
//! error; callers decide whether to skip or abort.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use brushograph_core::Point2;

use crate::error::{GcodeError, GcodeResult};

/// One address word, e.g. `X12.5`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Upper-case address letter
    pub letter: char,
    /// Numeric value
    pub value: f64,
}

/// Move mode carried by a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionKind {
    /// `G0` / `G00`
    Rapid,
    /// `G1` / `G01`
    Linear,
}

/// A tokenized G-code line
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedLine {
    /// 1-based line number within the parsed stream
    pub line_number: usize,
    /// Words in source order
    pub words: Vec<Word>,
}

impl ParsedLine {
    /// First value of the given address letter
    pub fn value(&self, letter: char) -> Option<f64> {
        self.words
            .iter()
            .find(|w| w.letter == letter)
            .map(|w| w.value)
    }

    /// Whether the line contains `G<code>`
    pub fn has_g(&self, code: u32) -> bool {
        self.words
            .iter()
            .any(|w| w.letter == 'G' && w.value == code as f64)
    }

    /// Rapid or linear move mode, if any
    pub fn motion(&self) -> Option<MotionKind> {
        if self.has_g(0) {
            Some(MotionKind::Rapid)
        } else if self.has_g(1) {
            Some(MotionKind::Linear)
        } else {
            None
        }
    }

    /// X word
    pub fn x(&self) -> Option<f64> {
        self.value('X')
    }

    /// Y word
    pub fn y(&self) -> Option<f64> {
        self.value('Y')
    }

    /// Z word
    pub fn z(&self) -> Option<f64> {
        self.value('Z')
    }

    /// F (feed rate) word
    pub fn feed(&self) -> Option<f64> {
        self.value('F')
    }

    /// E (extruder) word
    pub fn extrusion(&self) -> Option<f64> {
        self.value('E')
    }

    /// Planar target of a rapid/linear move carrying both X and Y
    pub fn planar_target(&self) -> Option<Point2> {
        self.motion()?;
        Some(Point2::new(self.x()?, self.y()?))
    }

    /// A move that changes Z and nothing in the plane
    pub fn is_z_only_move(&self) -> bool {
        self.motion().is_some() && self.z().is_some() && self.x().is_none() && self.y().is_none()
    }

    /// `G92 E0`: the extruder position is being reset
    pub fn is_extrusion_reset(&self) -> bool {
        self.has_g(92) && self.extrusion() == Some(0.0)
    }
}

/// Stateful line parser that numbers the lines it sees
#[derive(Debug, Default)]
pub struct GcodeParser {
    line_number: usize,
}

impl GcodeParser {
    /// Create a new parser starting before line 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of the last line handed to [`GcodeParser::parse`]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Parse the next line of the stream
    pub fn parse(&mut self, line: &str) -> GcodeResult<ParsedLine> {
        self.line_number += 1;
        let line_number = self.line_number;

        let cleaned = remove_comments(line);
        let mut rest = cleaned.trim();
        if rest.is_empty() || rest == "%" {
            return Err(GcodeError::EmptyLine { line_number });
        }

        let mut words = Vec::new();
        while !rest.is_empty() {
            let Some(caps) = word_regex().captures(rest) else {
                let token = rest.split_whitespace().next().unwrap_or(rest);
                let starts_with_letter = token.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
                return Err(if starts_with_letter {
                    GcodeError::InvalidSyntax {
                        line_number,
                        reason: format!("malformed word '{}'", token),
                    }
                } else {
                    GcodeError::UnsupportedWord {
                        line_number,
                        word: token.to_string(),
                    }
                });
            };

            let whole = caps.get(0).map_or(0, |m| m.end());
            let letter = caps[1]
                .chars()
                .next()
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or('?');
            let value = caps[2]
                .parse::<f64>()
                .map_err(|e| GcodeError::InvalidSyntax {
                    line_number,
                    reason: format!("bad number '{}': {}", &caps[2], e),
                })?;

            words.push(Word { letter, value });
            rest = rest[whole..].trim_start();
        }

        Ok(ParsedLine { line_number, words })
    }
}

/// Remove comments from a G-Code line
fn remove_comments(line: &str) -> String {
    static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = COMMENT_REGEX.get_or_init(|| Regex::new(r"[;(].*").expect("invalid regex pattern"));
    regex.replace(line, "").to_string()
}

fn word_regex() -> &'static Regex {
    static WORD_REGEX: OnceLock<Regex> = OnceLock::new();
    WORD_REGEX.get_or_init(|| {
        Regex::new(r"^([A-Za-z])\s*([-+]?(?:\d+\.?\d*|\.\d+))").expect("invalid regex pattern")
    })
}
