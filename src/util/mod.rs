//! Utility modules: polling and browser launching.

pub mod browser;
pub mod poll;
