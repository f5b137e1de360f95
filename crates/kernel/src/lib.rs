//! Core kernel for LIBRIS: settings, the module trait, and the registry.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
