//! Background fitting: loop or trim to length, scale to height, centre-crop to width.

pub(crate) mod fit;
