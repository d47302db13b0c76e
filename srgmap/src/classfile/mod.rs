//! Minimal class-file model for constant-pool symbol renaming.
//!
//! Only the constant pool is semantically interpreted; every other section
//! of the class file is length-checked and copied through verbatim. That is
//! what makes the rewrite safe: a `Utf8` entry keeps its index, so bytecode
//! operands and attribute tables that point at it stay correct without ever
//! being parsed.

pub mod cpool;
pub mod remap;

pub use cpool::{ConstPool, Entry};
pub use remap::remap_class;
