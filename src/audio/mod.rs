//! Narration audio: segment tracks joined end to end in presentation order.

pub(crate) mod concat;
