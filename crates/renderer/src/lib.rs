//! 2D display backend for the tactical map client.
//!
//! The map overview draws through the narrow [`Surface`] trait (textured
//! quads, filled rects, text); texture handles are resolved by name via
//! [`TextureCatalog`]. A recording [`DrawList`] implementation backs the
//! tests, and [`AsciiCanvas`] rasterizes to a terminal for the demo loop.

pub mod ascii;
pub mod surface;
pub mod textures;

pub use ascii::*;
pub use surface::*;
pub use textures::*;
