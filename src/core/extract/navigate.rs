//! Safe navigation over optional elements
//!
//! A [`Probe`] wraps a possibly-missing element. Every step on a missing element yields another
//! missing element, and reading from a missing element yields the empty string, so multi-level
//! optional lookups read as a single chain.

use crate::core::document::{Element, ElementPath, QName, TextDecodeError};

/// A possibly-absent element
///
/// # Examples
///
/// ```
/// use healthport::core::document::{parse_document, QName};
/// use healthport::core::extract::navigate::Probe;
///
/// let document = parse_document(r#"<obs><value unit="degF"/></obs>"#, "inline.xml").unwrap();
/// let observation = Probe::new(document.root());
///
/// assert_eq!(observation.child(&QName::local("value")).attr("unit"), "degF");
/// assert_eq!(observation.child(&QName::local("missing")).attr("unit"), "");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Probe<'a> {
    element: Option<&'a Element>,
}

impl<'a> Probe<'a> {
    pub fn new(element: &'a Element) -> Self {
        Self {
            element: Some(element),
        }
    }

    pub fn absent() -> Self {
        Self { element: None }
    }

    /// First direct child with the given name
    pub fn child(self, name: &QName) -> Self {
        Self {
            element: self.element.and_then(|element| element.child(name)),
        }
    }

    /// First element reached by `path`
    pub fn path(self, path: &ElementPath) -> Self {
        Self {
            element: self.element.and_then(|element| element.find(path)),
        }
    }

    /// Attribute value, empty when the element or the attribute is missing
    pub fn attr(self, name: &str) -> &'a str {
        self.element
            .and_then(|element| element.attribute(name))
            .unwrap_or("")
    }

    /// Decoded text, empty when the element is missing
    ///
    /// # Errors
    ///
    /// Returns [`TextDecodeError`] when the element exists but its text cannot be decoded.
    pub fn text(self) -> Result<String, TextDecodeError> {
        match self.element {
            Some(element) => element.text(),
            None => Ok(String::new()),
        }
    }

    pub fn element(self) -> Option<&'a Element> {
        self.element
    }

    pub fn is_present(self) -> bool {
        self.element.is_some()
    }
}

impl<'a> From<Option<&'a Element>> for Probe<'a> {
    fn from(element: Option<&'a Element>) -> Self {
        Self { element }
    }
}
