//! Status-to-fill-color policy for graph nodes.
//!
//! Color scheme:
//!   - Active:   yellow (In Progress, Code Review)
//!   - Done-ish: green  (Master, In CI, In QA, Testing, Ready To Go, Finished)
//!   - Default:  white  (everything else, including unknown and empty labels)

use serde::Serialize;
use std::fmt;

/// Fill color of an issue node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    /// Work is actively happening
    Yellow,
    /// Work is complete or in its final stages
    Green,
    /// Anything else
    White,
}

impl StatusColor {
    /// Graphviz color name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::White => "white",
        }
    }
}

impl fmt::Display for StatusColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a status label to its fill color. Labels match exactly.
pub fn status_color(status: &str) -> StatusColor {
    match status {
        "In Progress" | "Code Review" => StatusColor::Yellow,
        "Master" | "In CI" | "In QA" | "Testing" | "Ready To Go" | "Finished" => {
            StatusColor::Green
        }
        _ => StatusColor::White,
    }
}
