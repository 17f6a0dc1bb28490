use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad threshold, empty bibliography id, etc.).
    ConfigValidation(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

/// A structural assumption about a coefficient document did not hold.
///
/// Never fatal: the engine turns it into an `ExtractionError` outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// Wrong number of nodes with a given tag (e.g. three `polynomial` nodes).
    NodeCount {
        node: String,
        expected: usize,
        found: usize,
    },
    /// Warehouse polynomials are not in low-T, high-T order.
    SegmentOrder { first: f64, second: f64 },
    /// A segment does not hold exactly seven coefficients.
    CoefficientCount { segment: String, found: usize },
    /// A coefficient or bound could not be read as a number.
    NumberParse { segment: String, value: String },
    /// A coefficient's own label disagrees with its position in the segment.
    ColumnLabel {
        segment: String,
        position: usize,
        label: String,
    },
    /// A required node is absent.
    MissingNode(String),
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeCount { node, expected, found } => {
                write!(f, "expected {expected} <{node}> node(s), found {found}")
            }
            Self::SegmentOrder { first, second } => write!(
                f,
                "polynomials out of order: first lower bound {first} is not below second {second}"
            ),
            Self::CoefficientCount { segment, found } => {
                write!(f, "segment '{segment}': expected 7 coefficients, found {found}")
            }
            Self::NumberParse { segment, value } => {
                write!(f, "segment '{segment}': cannot parse number '{value}'")
            }
            Self::ColumnLabel { segment, position, label } => write!(
                f,
                "segment '{segment}': coefficient {position} is labelled '{label}'"
            ),
            Self::MissingNode(node) => write!(f, "missing <{node}> node"),
        }
    }
}

impl std::error::Error for ExtractionError {}
