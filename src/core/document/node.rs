//! In-memory element tree
//!
//! Elements carry their resolved namespace URI, so lookups are written against
//! `prefix:name` paths resolved through a caller-supplied [`NamespaceMap`], independent of the
//! prefixes the document itself happens to use.

use crate::domain::{HealthportError, Result};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Prefix to namespace URI bindings
///
/// The empty prefix stands for the default namespace when the map describes a document's
/// own declarations. Lookup paths never use it: an unprefixed step always means
/// "no namespace".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceMap {
    bindings: BTreeMap<String, String>,
}

impl NamespaceMap {
    /// Creates an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding, builder style
    pub fn with(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.insert(prefix, uri);
        self
    }

    /// Adds or replaces a binding
    pub fn insert(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.bindings.insert(prefix.into(), uri.into());
    }

    /// URI bound to `prefix`
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(String::as_str)
    }

    /// URI of the default namespace, if one is declared
    pub fn default_namespace(&self) -> Option<&str> {
        self.resolve("")
    }

    /// (prefix, uri) pairs, sorted by prefix
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings
            .iter()
            .map(|(prefix, uri)| (prefix.as_str(), uri.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Namespace-qualified element name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    namespace: Option<String>,
    local: String,
}

impl QName {
    /// Name in the given namespace
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// Name without a namespace
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    /// Parses `prefix:name` or `name`, resolving the prefix through `namespaces`
    pub fn parse(step: &str, namespaces: &NamespaceMap) -> Result<Self> {
        match step.split_once(':') {
            Some((prefix, local)) => {
                let uri = namespaces.resolve(prefix).ok_or_else(|| {
                    HealthportError::Validation(format!(
                        "Unknown namespace prefix '{prefix}' in '{step}'"
                    ))
                })?;
                if local.is_empty() {
                    return Err(HealthportError::Validation(format!(
                        "Empty element name in '{step}'"
                    )));
                }
                Ok(Self::new(uri, local))
            }
            None if step.is_empty() => Err(HealthportError::Validation(
                "Empty element name in path".to_string(),
            )),
            None => Ok(Self::local(step)),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(uri) => write!(f, "{{{uri}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// A `/`-separated sequence of direct-child steps
///
/// # Examples
///
/// ```
/// use healthport::core::document::{ElementPath, NamespaceMap};
///
/// let ns = NamespaceMap::new().with("cda", "urn:hl7-org:v3");
/// let path = ElementPath::parse("cda:effectiveTime/cda:low", &ns).unwrap();
/// assert_eq!(path.steps().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPath {
    steps: Vec<QName>,
}

impl ElementPath {
    /// Parses a path such as `cda:text/cda:sourceName`
    pub fn parse(path: &str, namespaces: &NamespaceMap) -> Result<Self> {
        let steps = path
            .split('/')
            .map(|step| QName::parse(step, namespaces))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[QName] {
        &self.steps
    }
}

impl From<QName> for ElementPath {
    fn from(name: QName) -> Self {
        Self { steps: vec![name] }
    }
}

/// A piece of character data inside an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TextChunk {
    /// Character data as written, entity references not yet expanded
    Escaped(String),
    /// CDATA section content, taken literally
    Cdata(String),
}

/// Element text that could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot decode text of <{element}>: {reason}")]
pub struct TextDecodeError {
    pub element: String,
    pub reason: String,
}

/// One element of a parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub(crate) name: QName,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) text: Vec<TextChunk>,
    pub(crate) children: Vec<Element>,
}

impl Element {
    pub(crate) fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            text: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &QName {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.name.namespace()
    }

    pub fn local_name(&self) -> &str {
        self.name.local_name()
    }

    /// Direct child elements in document order
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Attribute value by name as written in the document (`value`, `xsi:type`)
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether the element has the given qualified name
    pub fn is(&self, name: &QName) -> bool {
        self.name == *name
    }

    /// Decoded character data inside this element, up to its first child element
    ///
    /// Text following a child element is not part of this element's text. An element without
    /// character data yields an empty string.
    pub fn text(&self) -> std::result::Result<String, TextDecodeError> {
        let mut out = String::new();
        for chunk in &self.text {
            match chunk {
                TextChunk::Escaped(raw) => {
                    let decoded: Cow<'_, str> =
                        quick_xml::escape::unescape(raw).map_err(|e| TextDecodeError {
                            element: self.name.local_name().to_string(),
                            reason: e.to_string(),
                        })?;
                    out.push_str(&decoded);
                }
                TextChunk::Cdata(content) => out.push_str(content),
            }
        }
        Ok(out)
    }

    /// First direct child with the given name
    pub fn child(&self, name: &QName) -> Option<&Element> {
        self.children.iter().find(|child| child.is(name))
    }

    /// Direct children with the given name
    pub fn find_all<'a>(&'a self, name: &'a QName) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.is(name))
    }

    /// First element reached by following `path` from this element
    pub fn find(&self, path: &ElementPath) -> Option<&Element> {
        self.select(path).into_iter().next()
    }

    /// Every element reached by following `path`, in document order
    pub fn select(&self, path: &ElementPath) -> Vec<&Element> {
        let mut current = vec![self];
        for step in path.steps() {
            current = current
                .into_iter()
                .flat_map(|element| element.children.iter())
                .filter(|child| child.is(step))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    /// Decoded text of the first element reached by `path`, `None` if there is no such element
    pub fn find_text(
        &self,
        path: &ElementPath,
    ) -> std::result::Result<Option<String>, TextDecodeError> {
        self.find(path).map(Element::text).transpose()
    }

    /// Every element below this one with the given name, pre-order, excluding `self`
    pub fn descendants<'a>(&'a self, name: &QName) -> Vec<&'a Element> {
        let mut found = Vec::new();
        let mut stack: Vec<&Element> = self.children.iter().rev().collect();
        while let Some(element) = stack.pop() {
            if element.is(name) {
                found.push(element);
            }
            stack.extend(element.children.iter().rev());
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "urn:test";

    fn leaf(local: &str, text: &str) -> Element {
        let mut element = Element::new(QName::new(NS, local));
        element.text.push(TextChunk::Escaped(text.to_string()));
        element
    }

    fn sample() -> Element {
        let mut root = Element::new(QName::new(NS, "root"));
        let mut a = Element::new(QName::new(NS, "a"));
        a.children.push(leaf("b", "first"));
        let mut nested = Element::new(QName::new(NS, "a"));
        nested.children.push(leaf("b", "nested"));
        a.children.push(nested);
        root.children.push(a);
        root.children.push(leaf("b", "second"));
        root
    }

    #[test]
    fn test_qname_parse_prefixed() {
        let ns = NamespaceMap::new().with("t", NS);
        let name = QName::parse("t:value", &ns).unwrap();
        assert_eq!(name.namespace(), Some(NS));
        assert_eq!(name.local_name(), "value");
        assert_eq!(name.to_string(), "{urn:test}value");
    }

    #[test]
    fn test_qname_parse_unprefixed_has_no_namespace() {
        let ns = NamespaceMap::new().with("", NS);
        let name = QName::parse("Record", &ns).unwrap();
        assert_eq!(name.namespace(), None);
    }

    #[test]
    fn test_qname_parse_unknown_prefix() {
        let result = QName::parse("x:value", &NamespaceMap::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_path_parse_rejects_empty_step() {
        let ns = NamespaceMap::new().with("t", NS);
        assert!(ElementPath::parse("t:a//t:b", &ns).is_err());
        assert!(ElementPath::parse("t:", &ns).is_err());
    }

    #[test]
    fn test_descendants_pre_order() {
        let root = sample();
        let texts: Vec<String> = root
            .descendants(&QName::new(NS, "b"))
            .into_iter()
            .map(|e| e.text().unwrap())
            .collect();
        assert_eq!(texts, vec!["first", "nested", "second"]);
    }

    #[test]
    fn test_descendants_excludes_self() {
        let root = sample();
        assert!(root.descendants(&QName::new(NS, "root")).is_empty());
        assert_eq!(root.descendants(&QName::new(NS, "a")).len(), 2);
    }

    #[test]
    fn test_find_follows_direct_children_only() {
        let root = sample();
        let ns = NamespaceMap::new().with("t", NS);

        let first = root.find(&ElementPath::parse("t:a/t:b", &ns).unwrap());
        assert_eq!(first.unwrap().text().unwrap(), "first");

        let direct = root.find(&ElementPath::parse("t:b", &ns).unwrap());
        assert_eq!(direct.unwrap().text().unwrap(), "second");

        assert!(root
            .find(&ElementPath::parse("t:a/t:missing", &ns).unwrap())
            .is_none());
    }

    #[test]
    fn test_find_text_missing_element_is_none() {
        let root = sample();
        let ns = NamespaceMap::new().with("t", NS);
        let text = root
            .find_text(&ElementPath::parse("t:nothing", &ns).unwrap())
            .unwrap();
        assert_eq!(text, None);
    }

    #[test]
    fn test_text_decodes_entities_and_cdata() {
        let mut element = Element::new(QName::local("note"));
        element
            .text
            .push(TextChunk::Escaped("Tom &amp; Jerry ".to_string()));
        element.text.push(TextChunk::Cdata("<raw> &amp;".to_string()));
        assert_eq!(element.text().unwrap(), "Tom & Jerry <raw> &amp;");
    }

    #[test]
    fn test_text_undecodable_entity() {
        let element = leaf("type", "Heart &bogus; Rate");
        let err = element.text().unwrap_err();
        assert_eq!(err.element, "type");
    }

    #[test]
    fn test_attribute_lookup() {
        let mut element = Element::new(QName::local("value"));
        element
            .attributes
            .push(("xsi:type".to_string(), "PQ".to_string()));
        element
            .attributes
            .push(("value".to_string(), "98.6".to_string()));

        assert_eq!(element.attribute("value"), Some("98.6"));
        assert_eq!(element.attribute("xsi:type"), Some("PQ"));
        assert_eq!(element.attribute("unit"), None);
    }
}
