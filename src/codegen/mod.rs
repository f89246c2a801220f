//! Output generation over accumulated catalogs.

pub mod enum_functions;
pub mod index;
