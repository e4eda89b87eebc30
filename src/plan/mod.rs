//! Render plans and how they are built: data model, job manifests, collaborator contracts.

pub(crate) mod collab;
pub(crate) mod manifest;
pub(crate) mod model;
pub(crate) mod script;
