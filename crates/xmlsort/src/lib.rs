//! xmlsort - configuration-driven sorting of XML elements and attributes
//!
//! # Quick Start
//!
//! ```
//! use xmlsort::{format_str, SortConfig};
//! # fn main() -> Result<(), xmlsort::Error> {
//! let config = SortConfig::from_json_str(r#"{"relevantKeys": {"item": "name"}}"#)?;
//! let output = format_str(r#"<root><item name="b"/><item name="a"/></root>"#, &config)?;
//! assert!(output.find(r#"name="a""#) < output.find(r#"name="b""#));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod xml;
pub use xml::{
    Content as XmlContent, Document as XmlDocument, Element as XmlElement, ParseConfig,
    Parser as XmlParser, WriteConfig,
};

pub mod config;
pub use config::{
    ConfigCache, ConfigLoader, ConfigSource, LoadedConfig, RawSortConfig, SortConfig, SortRule,
    DEFAULT_CONFIG_FILE,
};

pub mod sort;
pub use sort::{sort, sort_element, Sorter};

pub mod format;
pub use format::{failure_message, format_str, FormatOutcome, Formatter, Options};

pub mod utils;

/// Parse XML from string
pub fn from_xml_str(s: &str) -> Result<XmlDocument> {
    XmlParser::new(s).parse()
}

/// Parse XML with custom limits
pub fn from_xml_str_with_config(s: &str, config: ParseConfig) -> Result<XmlDocument> {
    XmlParser::with_config(s, config).parse()
}

/// Serialize a document with the default writer settings
pub fn to_xml_string(doc: &XmlDocument) -> Result<String> {
    xml::writer::to_string(doc, WriteConfig::default())
}
