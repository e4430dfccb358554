//! Formatting pipeline: parse, sort, write
//!
//! Either the whole pipeline succeeds and a replacement text is produced, or
//! nothing is produced at all.

use tracing::{debug, info, instrument, warn};

use crate::config::SortConfig;
use crate::error::{Error, Result};
use crate::sort;
use crate::xml::{writer, ParseConfig, Parser, WriteConfig};

pub const SUCCESS_MESSAGE: &str = "The file has been formatted successfully!";

const FAILURE_PREFIX: &str = "An unexpected error has occurred. Details: ";
const PARSE_FAILURE_PREFIX: &str = "The document is not well-formed XML. Details: ";

/// Parser and writer settings for one formatting run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub parse: ParseConfig,
    pub write: WriteConfig,
}

/// Result of formatting a document for replacement
#[derive(Clone, Debug, PartialEq)]
pub enum FormatOutcome {
    /// Replace the whole document with `text`
    Edit { text: String, changed: bool },
    /// Leave the document untouched
    NoEdit { error: Error },
}

impl FormatOutcome {
    /// User-facing message for this outcome
    pub fn message(&self) -> String {
        match self {
            Self::Edit { .. } => SUCCESS_MESSAGE.to_string(),
            Self::NoEdit { error } => failure_message(error),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Edit { text, .. } => Some(text),
            Self::NoEdit { .. } => None,
        }
    }
}

/// Single user-facing message for any pipeline error
pub fn failure_message(error: &Error) -> String {
    if error.is_parse_error() {
        format!("{PARSE_FAILURE_PREFIX}{error}")
    } else {
        format!("{FAILURE_PREFIX}{error}")
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Formatter<'c> {
    config: &'c SortConfig,
    options: Options,
}

impl<'c> Formatter<'c> {
    pub fn new(config: &'c SortConfig) -> Self {
        Self {
            config,
            options: Options::default(),
        }
    }

    pub const fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Parse, sort and re-serialize `input`
    #[instrument(skip_all, fields(len = input.len()))]
    pub fn format(&self, input: &str) -> Result<String> {
        debug!("parsing document");
        let document = Parser::with_config(input, self.options.parse).parse()?;
        let sorted = sort::sort(document, self.config);
        debug!("writing document");
        writer::to_string(&sorted, self.options.write)
    }

    /// Format for whole-document replacement, all-or-nothing
    pub fn format_edit(&self, input: &str) -> FormatOutcome {
        match self.format(input) {
            Ok(text) => {
                let changed = text != input;
                info!(changed, "{SUCCESS_MESSAGE}");
                FormatOutcome::Edit { text, changed }
            }
            Err(error) => {
                warn!(%error, "formatting failed, leaving document unchanged");
                FormatOutcome::NoEdit { error }
            }
        }
    }
}

/// Format `input` with default parser and writer settings
pub fn format_str(input: &str, config: &SortConfig) -> Result<String> {
    Formatter::new(config).format(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SortRule;
    use crate::error::ErrorKind;

    fn compact() -> Options {
        Options {
            parse: ParseConfig::default(),
            write: WriteConfig::compact(),
        }
    }

    #[test]
    fn test_default_config_keeps_order() -> Result<()> {
        let config = SortConfig::default();
        let output = Formatter::new(&config)
            .with_options(compact())
            .format("<root><b/><a/></root>")?;
        assert_eq!(output, "<root><b/><a/></root>");
        Ok(())
    }

    #[test]
    fn test_ordering_and_exclusion_scenarios() -> Result<()> {
        let input = "<root><item name=\"b\"/><item name=\"a\"/></root>";
        let ordering = SortConfig::new().with_rule("item", SortRule::by("name").unwrap_or_default());
        let output = Formatter::new(&ordering).with_options(compact()).format(input)?;
        assert_eq!(output, "<root><item name=\"a\"/><item name=\"b\"/></root>");

        let exclusion = SortConfig::new().with_non_sort_key("item");
        let output = Formatter::new(&exclusion).with_options(compact()).format(input)?;
        assert_eq!(output, input);
        Ok(())
    }

    #[test]
    fn test_format_str_pretty_prints() -> Result<()> {
        let output = format_str("<root><a>x</a></root>", &SortConfig::default())?;
        assert_eq!(
            output,
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<root>\n  <a>x</a>\n</root>\n"
        );
        Ok(())
    }

    #[test]
    fn test_malformed_input_yields_no_edit() {
        let config = SortConfig::default();
        let outcome = Formatter::new(&config).format_edit("<root><a></root>");
        assert_eq!(outcome.text(), None);
        assert!(outcome
            .message()
            .starts_with("The document is not well-formed XML. Details: "));
        match outcome {
            FormatOutcome::NoEdit { error } => assert!(matches!(
                error.kind(),
                ErrorKind::MismatchedEndTag { .. }
            )),
            FormatOutcome::Edit { .. } => panic!("expected no edit"),
        }
    }

    #[test]
    fn test_edit_reports_change() {
        let config = SortConfig::new().with_rule("item", SortRule::by("name").unwrap_or_default());
        let formatter = Formatter::new(&config).with_options(compact());

        let outcome = formatter.format_edit("<r><item name=\"b\"/><item name=\"a\"/></r>");
        assert!(matches!(outcome, FormatOutcome::Edit { changed: true, .. }));
        assert_eq!(outcome.message(), SUCCESS_MESSAGE);

        let outcome = formatter.format_edit("<r><item name=\"a\"/><item name=\"b\"/></r>");
        assert!(matches!(outcome, FormatOutcome::Edit { changed: false, .. }));
    }

    #[test]
    fn test_generic_failure_message() {
        let error = Error::detached(ErrorKind::Write, "disk full");
        assert_eq!(
            failure_message(&error),
            "An unexpected error has occurred. Details: disk full"
        );
    }
}
