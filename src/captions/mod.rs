//! Word captions: one time-bounded sprite per spoken word.

pub(crate) mod render;
