//! CLI enum types for the run command.

use clap::ValueEnum;
use pixmill_core::TransformKind;

/// Transform selectable with `--only`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TransformArg {
    /// Luminance grayscale
    #[value(alias = "gray", alias = "grey")]
    Grayscale,
    /// Warm sepia tone
    Sepia,
    /// Black and white error diffusion
    #[value(alias = "dithered")]
    Dither,
}

impl From<TransformArg> for TransformKind {
    fn from(arg: TransformArg) -> Self {
        match arg {
            TransformArg::Grayscale => TransformKind::Grayscale,
            TransformArg::Sepia => TransformKind::Sepia,
            TransformArg::Dither => TransformKind::Dither,
        }
    }
}

impl std::fmt::Display for TransformArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", TransformKind::from(*self))
    }
}
