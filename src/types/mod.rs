//! Core types shared by the provider, tools, and coordinator.

pub mod run;
pub mod tool;

pub use run::*;
pub use tool::*;
