//! Command implementations

pub mod find_bindings;
pub mod migrate;
pub mod profile;
pub mod version;
