//! Document loader
//!
//! Parses an XML file into an [`Element`] tree with namespaces resolved. Attribute values are
//! decoded while parsing; element text is kept escaped and decoded on lookup.

use super::node::{Element, NamespaceMap, QName, TextChunk};
use crate::domain::LoadError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A parsed input document
///
/// Read-only after loading. Each export of a category loads its own copy.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    root: Element,
    namespaces: NamespaceMap,
}

impl Document {
    /// Root element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Namespace declarations found on the root element
    pub fn namespaces(&self) -> &NamespaceMap {
        &self.namespaces
    }

    /// File the document was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Loads and parses the document at `path`
///
/// # Errors
///
/// - [`LoadError::NotFound`] if the file does not exist
/// - [`LoadError::Unreadable`] if it cannot be read
/// - [`LoadError::Malformed`] if it is not well-formed XML
///
/// # Examples
///
/// ```no_run
/// use healthport::core::document::load_document;
///
/// let document = load_document("apple_health_export/export.xml").unwrap();
/// println!("root element: {}", document.root().local_name());
/// ```
pub fn load_document(path: impl AsRef<Path>) -> Result<Document, LoadError> {
    let path = path.as_ref();

    let bytes = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    let source = String::from_utf8(bytes)
        .map_err(|e| malformed(path, format!("invalid UTF-8: {e}")))?;

    let document = parse_document(&source, path)?;

    tracing::debug!(
        path = %path.display(),
        root = %document.root.name(),
        namespaces = document.namespaces.iter().count(),
        "Document loaded"
    );

    Ok(document)
}

/// Parses XML held in memory; `origin` is only used for error messages
pub fn parse_document(source: &str, origin: impl Into<PathBuf>) -> Result<Document, LoadError> {
    let origin = origin.into();
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let mut reader = NsReader::from_str(source);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut namespaces = NamespaceMap::new();

    loop {
        let position = reader.buffer_position();
        let (resolved, event) = match reader.read_resolved_event() {
            Ok(pair) => pair,
            Err(e) => {
                return Err(malformed(&origin, format!("{e} (near byte {position})")));
            }
        };

        let namespace = match resolved {
            ResolveResult::Bound(ns) => Some(utf8(ns.as_ref(), &origin)?.to_string()),
            ResolveResult::Unbound => None,
            ResolveResult::Unknown(prefix) => {
                return Err(malformed(
                    &origin,
                    format!(
                        "unbound namespace prefix '{}' (near byte {position})",
                        String::from_utf8_lossy(&prefix)
                    ),
                ))
            }
        };

        match event {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(malformed(&origin, "more than one root element"));
                }
                let (element, declarations) = open_element(&start, namespace, &origin)?;
                if stack.is_empty() {
                    for (prefix, uri) in declarations {
                        namespaces.insert(prefix, uri);
                    }
                }
                stack.push(element);
            }
            Event::Empty(start) => {
                let (element, declarations) = open_element(&start, namespace, &origin)?;
                if stack.is_empty() {
                    for (prefix, uri) in declarations {
                        namespaces.insert(prefix, uri);
                    }
                }
                attach(&mut stack, &mut root, element, &origin)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed(&origin, "end tag without matching start tag"))?;
                attach(&mut stack, &mut root, element, &origin)?;
            }
            // Only character data before an element's first child is its text; anything after
            // a child is that child's tail and is not kept
            Event::Text(text) => {
                let raw = utf8(&text, &origin)?;
                match stack.last_mut() {
                    Some(parent) if parent.children.is_empty() => {
                        parent.text.push(TextChunk::Escaped(raw.to_string()))
                    }
                    Some(_) => {}
                    None if raw.trim().is_empty() => {}
                    None => return Err(malformed(&origin, "text outside the root element")),
                }
            }
            Event::CData(data) => {
                let content = utf8(&data, &origin)?;
                match stack.last_mut() {
                    Some(parent) if parent.children.is_empty() => {
                        parent.text.push(TextChunk::Cdata(content.to_string()))
                    }
                    Some(_) => {}
                    None => return Err(malformed(&origin, "CDATA outside the root element")),
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no data
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(
            &origin,
            format!("unexpected end of document inside <{}>", open.local_name()),
        ));
    }

    let root = root.ok_or_else(|| malformed(&origin, "document has no root element"))?;

    Ok(Document {
        path: origin,
        root,
        namespaces,
    })
}

/// Builds an element from a start tag, splitting out namespace declarations
fn open_element(
    start: &BytesStart<'_>,
    namespace: Option<String>,
    origin: &Path,
) -> Result<(Element, Vec<(String, String)>), LoadError> {
    let local = utf8(start.local_name().as_ref(), origin)?.to_string();
    let name = match namespace {
        Some(uri) => QName::new(uri, local),
        None => QName::local(local),
    };

    let mut element = Element::new(name);
    let mut declarations = Vec::new();

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| {
            malformed(
                origin,
                format!("invalid attribute in <{}>: {e}", element.local_name()),
            )
        })?;
        let key = utf8(attribute.key.as_ref(), origin)?.to_string();
        let raw = normalize_attribute_whitespace(utf8(&attribute.value, origin)?);
        let value = quick_xml::escape::unescape(&raw)
            .map_err(|e| {
                malformed(
                    origin,
                    format!(
                        "cannot decode attribute '{key}' of <{}>: {e}",
                        element.local_name()
                    ),
                )
            })?
            .into_owned();

        if key == "xmlns" {
            declarations.push((String::new(), value));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            declarations.push((prefix.to_string(), value));
        } else {
            element.attributes.push((key, value));
        }
    }

    Ok((element, declarations))
}

/// Replaces literal tabs and line breaks in a raw attribute value with spaces
///
/// A `\r\n` pair counts as one line break. Character references such as `&#10;` are expanded
/// afterwards and keep their value.
fn normalize_attribute_whitespace(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['\t', '\r', '\n']) {
        return Cow::Borrowed(raw);
    }
    Cow::Owned(raw.replace("\r\n", " ").replace(['\t', '\r', '\n'], " "))
}

/// Closes `element` into its parent, or makes it the root
fn attach(
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
    element: Element,
    origin: &Path,
) -> Result<(), LoadError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => return Err(malformed(origin, "more than one root element")),
        None => *root = Some(element),
    }
    Ok(())
}

fn utf8<'a>(bytes: &'a [u8], origin: &Path) -> Result<&'a str, LoadError> {
    std::str::from_utf8(bytes).map_err(|e| malformed(origin, format!("invalid UTF-8: {e}")))
}

fn malformed(origin: &Path, reason: impl Into<String>) -> LoadError {
    LoadError::Malformed {
        path: origin.to_path_buf(),
        reason: reason.into(),
    }
}
