//! Host bridge for the Gentle Self UI shell.

pub mod api;
