//! Order fulfillment core: the transition table, the per-operation
//! actions and the post-commit side-effect machinery.

pub mod actions;
pub mod effects;
pub mod status;
