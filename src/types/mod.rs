// Shared domain types: used by both the engine layer and the UI layer.
// Neither layer depends on the other; both import from this module.

pub mod case_study;
pub mod common;
pub mod update;

pub use case_study::*;
pub use common::*;
pub use update::*;
