//! XML parser built on the quick-xml event reader

use std::borrow::Cow;

use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Reader;
use tracing::trace;

use crate::error::{Error, ErrorKind, Pos, Result, Span};
use crate::xml::model::{Content, Declaration, Document, Element, Misc};

/// Configuration for the XML parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 512,
            max_size: 64 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }
}

/// XML parser producing a [`Document`] tree.
///
/// Text is trimmed and whitespace-only text is dropped; comments and CDATA
/// sections are kept in place.
#[derive(Debug)]
pub struct Parser<'a> {
    source: &'a str,
    reader: Reader<&'a [u8]>,
    config: Config,
    stack: Vec<Element>,
}

impl<'a> Parser<'a> {
    /// Create a new XML parser
    pub fn new(input: &'a str) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a new parser with custom configuration
    pub fn with_config(input: &'a str, config: Config) -> Self {
        let mut reader = Reader::from_str(input);
        let reader_config = reader.config_mut();
        reader_config.trim_text_start = false;
        reader_config.trim_text_end = false;
        // end tags are matched against our own stack to report both names
        reader_config.check_end_names = false;

        Self {
            source: input,
            reader,
            config,
            stack: Vec::new(),
        }
    }

    /// Parse an XML document
    pub fn parse(&mut self) -> Result<Document> {
        if self.config.max_size > 0 && self.source.len() > self.config.max_size {
            return Err(Error::new(
                ErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                },
                Span::empty(),
            ));
        }

        let mut declaration = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event_start = to_offset(self.reader.buffer_position());
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    let offset = to_offset(self.reader.error_position());
                    return Err(self.error_at(ErrorKind::Syntax, offset, err.to_string()));
                }
            };

            match event {
                Event::Start(start) => {
                    if root.is_some() && self.stack.is_empty() {
                        return Err(self.error_at(
                            ErrorKind::MultipleRoots,
                            event_start,
                            "multiple root elements",
                        ));
                    }
                    self.check_depth(event_start)?;
                    let element = self.open_element(&start, event_start)?;
                    self.stack.push(element);
                }
                Event::Empty(start) => {
                    self.check_depth(event_start)?;
                    let element = self.open_element(&start, event_start)?;
                    self.close_element(element, &mut root, event_start)?;
                }
                Event::End(end) => {
                    let found = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    let Some(element) = self.stack.pop() else {
                        return Err(self.error_at(
                            ErrorKind::Syntax,
                            event_start,
                            format!("unexpected closing tag </{found}>"),
                        ));
                    };
                    if element.name != found {
                        let kind = ErrorKind::MismatchedEndTag {
                            expected: element.name,
                            found,
                        };
                        let message = kind.to_string();
                        return Err(self.error_at(kind, event_start, message));
                    }
                    self.close_element(element, &mut root, event_start)?;
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|err| self.error_at(ErrorKind::Syntax, event_start, err.to_string()))?;
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    match self.stack.last_mut() {
                        Some(parent) => parent.children.push(Content::Text(trimmed.to_string())),
                        None => {
                            return Err(self.error_at(
                                ErrorKind::TextOutsideRoot,
                                event_start,
                                "text outside of the root element",
                            ));
                        }
                    }
                }
                Event::CData(cdata) => {
                    let value = lossy(&cdata);
                    match self.stack.last_mut() {
                        Some(parent) => parent.children.push(Content::CData(value)),
                        None => {
                            return Err(self.error_at(
                                ErrorKind::TextOutsideRoot,
                                event_start,
                                "cdata outside of the root element",
                            ));
                        }
                    }
                }
                Event::Comment(comment) => {
                    let value = lossy(&comment);
                    match self.stack.last_mut() {
                        Some(parent) => parent.children.push(Content::Comment(value)),
                        None if root.is_some() => epilog.push(Misc::Comment(value)),
                        None => prolog.push(Misc::Comment(value)),
                    }
                }
                Event::PI(pi) => {
                    let value = lossy(&pi);
                    if self.stack.is_empty() {
                        let misc = Misc::ProcessingInstruction(value);
                        if root.is_some() {
                            epilog.push(misc);
                        } else {
                            prolog.push(misc);
                        }
                    } else {
                        trace!("dropping processing instruction inside element");
                    }
                }
                Event::DocType(doctype) => {
                    prolog.push(Misc::DocType(lossy(&doctype).trim().to_string()));
                }
                Event::Decl(decl) => {
                    declaration = Some(
                        read_declaration(&decl)
                            .map_err(|msg| self.error_at(ErrorKind::Syntax, event_start, msg))?,
                    );
                }
                Event::Eof => break,
            }
        }

        if let Some(open) = self.stack.last() {
            let message = format!("unexpected end of input, expected </{}>", open.name);
            return Err(self.error_at(ErrorKind::Syntax, self.source.len(), message));
        }

        let Some(root) = root else {
            return Err(Error::new(ErrorKind::EmptyDocument, Span::empty()));
        };

        Ok(Document {
            declaration,
            prolog,
            root,
            epilog,
        })
    }

    fn open_element(&self, start: &BytesStart<'_>, event_start: usize) -> Result<Element> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = IndexMap::new();

        for attr in start.attributes() {
            let attr =
                attr.map_err(|err| self.error_at(ErrorKind::Syntax, event_start, err.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|err| self.error_at(ErrorKind::Syntax, event_start, err.to_string()))?;
            attributes.insert(key, value.into_owned());
        }

        Ok(Element {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    fn close_element(
        &mut self,
        element: Element,
        root: &mut Option<Element>,
        event_start: usize,
    ) -> Result<()> {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(Content::Element(element));
            return Ok(());
        }
        if root.is_some() {
            return Err(self.error_at(
                ErrorKind::MultipleRoots,
                event_start,
                "multiple root elements",
            ));
        }
        *root = Some(element);
        Ok(())
    }

    fn check_depth(&self, event_start: usize) -> Result<()> {
        let max = self.config.max_depth;
        if max > 0 && self.stack.len() >= usize::from(max) {
            let kind = ErrorKind::MaxDepthExceeded { max };
            let message = kind.to_string();
            return Err(self.error_at(kind, event_start, message));
        }
        Ok(())
    }

    fn error_at(&self, kind: ErrorKind, offset: usize, message: impl Into<String>) -> Error {
        let pos = Pos::locate(self.source, offset);
        Error::with_message(kind, Span::at(pos), message)
    }
}

fn read_declaration(decl: &BytesDecl<'_>) -> std::result::Result<Declaration, String> {
    let version = decl.version().map_err(|err| err.to_string())?;
    let encoding = match decl.encoding() {
        Some(encoding) => Some(lossy_cow(encoding.map_err(|err| err.to_string())?)),
        None => None,
    };
    let standalone = match decl.standalone() {
        Some(standalone) => Some(lossy_cow(standalone.map_err(|err| err.to_string())?)),
        None => None,
    };

    Ok(Declaration {
        version: lossy_cow(version),
        encoding,
        standalone,
    })
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn lossy_cow(bytes: Cow<'_, [u8]>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}

fn to_offset(position: u64) -> usize {
    usize::try_from(position).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ensure_eq<T: PartialEq + std::fmt::Debug>(left: T, right: T) -> Result<()> {
        if left == right {
            Ok(())
        } else {
            Err(Error::with_message(
                ErrorKind::Syntax,
                Span::empty(),
                format!("assertion failed: left={left:?} right={right:?}"),
            ))
        }
    }

    #[test]
    fn test_parse_simple_element() -> Result<()> {
        let mut parser = Parser::new("<root></root>");
        let doc = parser.parse()?;

        ensure_eq(doc.root.name, "root".to_string())?;
        ensure_eq(doc.root.children.len(), 0)?;
        Ok(())
    }

    #[test]
    fn test_parse_with_attributes_keeps_order() -> Result<()> {
        let mut parser = Parser::new("<root name='test' id=\"1\" a=\"&amp;\"></root>");
        let doc = parser.parse()?;

        let keys: Vec<&str> = doc.root.attributes.keys().map(String::as_str).collect();
        ensure_eq(keys, vec!["name", "id", "a"])?;
        ensure_eq(doc.root.attributes.get("a"), Some(&"&".to_string()))?;
        Ok(())
    }

    #[test]
    fn test_parse_trims_text_and_drops_whitespace() -> Result<()> {
        let mut parser = Parser::new("<root>\n  <child>  text &lt;x&gt; </child>\n</root>");
        let doc = parser.parse()?;

        ensure_eq(doc.root.children.len(), 1)?;
        let child = doc.root.find("child");
        ensure_eq(
            child.and_then(Element::text),
            Some("text <x>".to_string()),
        )?;
        Ok(())
    }

    #[test]
    fn test_parse_declaration_prolog_and_comments() -> Result<()> {
        let input = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- head -->\n<root><!-- inner --><![CDATA[a<b]]></root>\n<!-- tail -->";
        let doc = Parser::new(input).parse()?;

        ensure_eq(
            doc.declaration,
            Some(Declaration {
                version: "1.0".to_string(),
                encoding: Some("UTF-8".to_string()),
                standalone: None,
            }),
        )?;
        ensure_eq(doc.prolog, vec![Misc::Comment(" head ".to_string())])?;
        ensure_eq(doc.epilog, vec![Misc::Comment(" tail ".to_string())])?;
        ensure_eq(
            doc.root.children,
            vec![
                Content::Comment(" inner ".to_string()),
                Content::CData("a<b".to_string()),
            ],
        )?;
        Ok(())
    }

    #[test]
    fn test_mismatched_end_tag() -> Result<()> {
        let err = match Parser::new("<root>\n<a></b></root>").parse() {
            Ok(_) => return ensure_eq("ok", "error"),
            Err(err) => err,
        };
        ensure_eq(
            err.kind().clone(),
            ErrorKind::MismatchedEndTag {
                expected: "a".to_string(),
                found: "b".to_string(),
            },
        )?;
        ensure_eq(err.span().start.line, 2)?;
        Ok(())
    }

    #[test]
    fn test_structural_errors() -> Result<()> {
        let cases = [
            ("", ErrorKind::EmptyDocument),
            ("<!-- only -->", ErrorKind::EmptyDocument),
            ("<a/><b/>", ErrorKind::MultipleRoots),
            ("<a></a><b></b>", ErrorKind::MultipleRoots),
            ("stray<a/>", ErrorKind::TextOutsideRoot),
            ("<a><b></a>", ErrorKind::MismatchedEndTag {
                expected: "b".to_string(),
                found: "a".to_string(),
            }),
            ("<a>", ErrorKind::Syntax),
        ];
        for (input, expected) in cases {
            match Parser::new(input).parse() {
                Ok(doc) => return ensure_eq(format!("{doc:?}"), format!("{expected:?}")),
                Err(err) => ensure_eq(err.kind().clone(), expected)?,
            }
        }
        Ok(())
    }

    #[test]
    fn test_depth_and_size_limits() -> Result<()> {
        let deep = "<a><a><a><a></a></a></a></a>";
        let err = Parser::with_config(deep, Config::new(3, 0)).parse();
        ensure_eq(
            err.map_err(|e| e.kind().clone()).err(),
            Some(ErrorKind::MaxDepthExceeded { max: 3 }),
        )?;

        let err = Parser::with_config(deep, Config::new(0, 8)).parse();
        ensure_eq(
            err.map_err(|e| e.kind().clone()).err(),
            Some(ErrorKind::MaxSizeExceeded { max: 8 }),
        )?;

        ensure_eq(Parser::with_config(deep, Config::unlimited()).parse().is_ok(), true)?;
        Ok(())
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.max_depth, 512);
        assert_eq!(config.max_size, 64 * 1024 * 1024);
    }
}
