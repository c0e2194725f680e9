//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::render::OutputFormat;

/// Output format for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    /// PNG image
    Png,
    /// SVG image
    Svg,
    /// PDF document
    Pdf,
    /// DOT source only (no Graphviz needed)
    Dot,
}

impl std::fmt::Display for OutputFormatArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", OutputFormat::from(*self))
    }
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Png => Self::Png,
            OutputFormatArg::Svg => Self::Svg,
            OutputFormatArg::Pdf => Self::Pdf,
            OutputFormatArg::Dot => Self::Dot,
        }
    }
}
