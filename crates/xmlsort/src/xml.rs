//! XML tree model, parser and writer

pub mod model;
pub mod parser;
pub mod writer;

pub use model::{Content, Declaration, Document, Element, Misc};
pub use parser::{Config as ParseConfig, Parser};
pub use writer::{Config as WriteConfig, Writer};
