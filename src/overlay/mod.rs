//! Still-image overlays (title cards and similar).

pub(crate) mod place;
