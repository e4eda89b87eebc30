//! End-to-end render driver.

pub(crate) mod pipeline;
