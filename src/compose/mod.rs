//! Layer stacking: fitted background, then overlays, then captions.

pub(crate) mod stream;
