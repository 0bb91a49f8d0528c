//! Report rendering: gas table -> self-contained HTML document.

pub mod color;
pub mod html;

pub use color::{ColorScale, Rgb};
pub use html::render_html_report;

/// How a measured cell's cost is annotated relative to its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PercentMode {
    /// `+N%` above the cheapest market.
    #[default]
    AboveMinimum,
    /// `N%` of the most expensive market.
    OfMaximum,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub colors: ColorScale,
    pub percent: PercentMode,
}
