//! Charts module - Chart descriptions and SVG rendering

mod renderer;
mod spec;

pub use renderer::{ChartRenderer, RenderError};
pub use spec::{palette, ChartKind, ChartMapping, ChartSpec, FacetStyle, DPI, PALETTE};
