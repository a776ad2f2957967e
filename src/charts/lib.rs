//! Interactive financial charts and indicator overlays.
//!
//! A [`Chart`] pairs the [`Frame`](frame::Frame) it was built from with a
//! [`Figure`]: traces on a stack of subplot rows. Figures are written out as
//! plotly HTML pages or drawn to SVG/PNG with `plotters`.

mod builders;
mod chart;
mod error;
pub mod figure;
mod overlays;
pub mod render;

pub use builders::*;
pub use chart::*;
pub use error::{PlotError, Result};
pub use figure::{
    AxisValues, Bar, Candlestick, Contour, Dash, Figure, Fill, Grid, HLine, Heatmap, Layout, Line,
    Marker, Mode, Scatter, Trace, TraceCommon, make_subplots,
};
pub use overlays::*;
