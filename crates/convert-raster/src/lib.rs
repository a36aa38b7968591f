//! Content rasterizer and paginator for markup-based renderers.
//!
//! Markup is parsed into a small block tree ([`markup`]), laid out at a
//! fixed CSS-pixel width under a [`stylesheet`], painted onto an off-screen
//! [`surface`] and cut into page bands by the [`paginate`] module. The
//! [`pipeline`] ties these together and writes the pages to a PDF.

pub mod fonts;
pub mod layout;
pub mod markup;
pub mod paginate;
pub mod pipeline;
pub mod stylesheet;
pub mod surface;

pub use markup::{html_title, parse_html, Block};
pub use pipeline::render_markup;
pub use stylesheet::Stylesheet;
pub use surface::{GlyphRasterizer, RasterBackend, SurfaceHost};
