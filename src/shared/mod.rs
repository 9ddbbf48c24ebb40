//! Helpers shared across lint-svn modules

pub mod glob;
