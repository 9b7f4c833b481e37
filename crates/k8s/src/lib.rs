//! Kubernetes manifest model used by yamldiff.
//!
//! A manifest bundle is a multi-document YAML stream. [`list_resources`] turns it
//! into [`Resource`]s, each identified across bundles by its [`ResourceKey`].

mod parse;
mod resource;

pub use parse::{list_resources, process_resources, ParseError};
pub use resource::{Resource, ResourceError, ResourceKey, DEFAULT_NAMESPACE};
