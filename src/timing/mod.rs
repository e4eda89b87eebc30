//! Word timings on the render's absolute time axis.

pub(crate) mod normalize;
