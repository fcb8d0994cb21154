//! CLI command implementations.

pub mod add;
pub mod flags;
pub mod kavuahs;
pub mod list;
pub mod remove;
