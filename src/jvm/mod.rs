//! The small slice of JVM class-file vocabulary the instrumentation pass
//! needs to refer to: references to classes and methods, and their access
//! flags. Parsing and serializing these from/to actual class-file bytes is
//! the front-end's job, not this crate's.

pub mod access_flags;
pub mod references;

pub use access_flags::MethodAccessFlags;
pub use references::{ClassRef, MethodRef};
