//! Document loading and tree queries
//!
//! - [`loader`] - XML parsing into an in-memory tree ([`load_document`])
//! - [`node`] - element tree, qualified names, paths and namespace maps

pub mod loader;
pub mod node;

pub use loader::{load_document, parse_document, Document};
pub use node::{Element, ElementPath, NamespaceMap, QName, TextDecodeError};
