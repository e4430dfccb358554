//! XML serializer built on the quick-xml writer
//!
//! Attributes and children are emitted exactly in the order stored in the
//! tree. Sorting relies on this.

use std::borrow::Cow;
use std::fmt;

use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Writer as XmlWriter;

use crate::error::{Error, ErrorKind, Result};
use crate::xml::model::{Content, Declaration, Document, Element, Misc};

/// Configuration for the XML writer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Spaces per nesting level (0 writes everything on one line)
    pub indent: usize,
    /// Emit an XML declaration, the document's own or the default one
    pub declaration: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent: 2,
            declaration: true,
        }
    }
}

impl Config {
    pub const fn compact() -> Self {
        Self {
            indent: 0,
            declaration: false,
        }
    }
}

/// Serializes a [`Document`] to text
pub struct Writer {
    inner: XmlWriter<Vec<u8>>,
    config: Config,
}

impl fmt::Debug for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Writer {
    pub fn new(config: Config) -> Self {
        let inner = if config.indent > 0 {
            XmlWriter::new_with_indent(Vec::new(), b' ', config.indent)
        } else {
            XmlWriter::new(Vec::new())
        };
        Self { inner, config }
    }

    /// Serialize the whole document and return the text
    pub fn write_document(mut self, doc: &Document) -> Result<String> {
        if self.config.declaration {
            let default = Declaration::default();
            let decl = doc.declaration.as_ref().unwrap_or(&default);
            self.emit(Event::Decl(BytesDecl::new(
                &decl.version,
                decl.encoding.as_deref(),
                decl.standalone.as_deref(),
            )))?;
        }

        for misc in &doc.prolog {
            self.write_misc(misc)?;
        }
        self.write_element(&doc.root)?;
        for misc in &doc.epilog {
            self.write_misc(misc)?;
        }

        let mut output = String::from_utf8(self.inner.into_inner())
            .map_err(|err| Error::detached(ErrorKind::Write, err.to_string()))?;
        if self.config.indent > 0 {
            output.push('\n');
        }
        Ok(output)
    }

    fn write_element(&mut self, element: &Element) -> Result<()> {
        let mut start = BytesStart::new(element.name.as_str());
        for (key, value) in &element.attributes {
            start.push_attribute(Attribute {
                key: QName(key.as_bytes()),
                value: Cow::Owned(escape_attribute(value).into_bytes()),
            });
        }

        if element.children.is_empty() {
            return self.emit(Event::Empty(start));
        }

        self.emit(Event::Start(start))?;
        for child in &element.children {
            match child {
                Content::Element(child) => self.write_element(child)?,
                Content::Text(text) => self.emit(Event::Text(BytesText::new(text)))?,
                Content::CData(text) => self.emit(Event::CData(BytesCData::new(text.as_str())))?,
                Content::Comment(text) => {
                    self.emit(Event::Comment(BytesText::from_escaped(text.as_str())))?;
                }
            }
        }
        self.emit(Event::End(BytesEnd::new(element.name.as_str())))
    }

    fn write_misc(&mut self, misc: &Misc) -> Result<()> {
        match misc {
            Misc::Comment(text) => self.emit(Event::Comment(BytesText::from_escaped(text.as_str()))),
            Misc::ProcessingInstruction(content) => {
                self.emit(Event::PI(BytesPI::new(content.as_str())))
            }
            Misc::DocType(content) => {
                self.emit(Event::DocType(BytesText::from_escaped(content.as_str())))
            }
        }
    }

    fn emit(&mut self, event: Event<'_>) -> Result<()> {
        self.inner
            .write_event(event)
            .map_err(|err| Error::detached(ErrorKind::Write, err.to_string()))
    }
}

/// Escape an attribute value. Newlines, carriage returns and tabs become
/// character references so attribute-value normalization keeps them.
fn escape_attribute(value: &str) -> String {
    let escaped = escape(value);
    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped.into_owned();
    }
    let mut out = String::with_capacity(escaped.len());
    for ch in escaped.chars() {
        match ch {
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            other => out.push(other),
        }
    }
    out
}

/// Serialize a document with the given configuration
pub fn to_string(doc: &Document, config: Config) -> Result<String> {
    Writer::new(config).write_document(doc)
}
