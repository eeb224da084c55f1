//! The semantic translator and its supporting components: the type system,
//! the value model, lexical scopes, and the per-module IR namespace.

pub mod namespace;
pub mod scope;
pub mod translate;
pub mod types;
pub mod value;

pub use translate::{translate_file, Translator};
