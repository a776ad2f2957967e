pub mod color;
pub mod html;
pub mod raster;

pub use html::{PLOTLY_CDN, figure_to_html};
pub use raster::{render_png, render_svg};
