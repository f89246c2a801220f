//! Drivers that turn the parser's event stream into catalog data.
//!
//! Each driver owns its accumulated map and holds its bus subscription;
//! dropping a driver disconnects it, so a parser can never call into a
//! driver that has gone away.

pub mod classes;
pub mod enums;
pub mod namespaces;

pub use classes::ClassDriver;
pub use enums::EnumDriver;
pub use namespaces::NamespaceTracker;
