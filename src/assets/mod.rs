//! Input decoding: media probing and streaming through `ffmpeg`, still images, caption glyphs.

pub(crate) mod decode;
pub(crate) mod media;
pub(crate) mod sprite;
pub(crate) mod text;
