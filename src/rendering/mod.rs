pub mod painted;
pub mod raster;
pub mod surface;
pub mod viewport;
