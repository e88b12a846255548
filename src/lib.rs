//! Discover OpenAPI generator plugins, inspect OpenAPI documents and
//! dispatch build targets to the matching plugin.

pub mod build;
pub mod case;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod inspect;
pub mod openapi;
pub mod plugin;
pub mod shell;

pub use error::{Error, Result};
pub use plugin::{Plugin, PluginRegistry};
