/// Request-to-poster pipeline.
pub(crate) mod compositor;
/// Raster surface backed by `vello_cpu`.
pub(crate) mod surface;
