//! Per-key sort rules
//!
//! A rule is written in the config file as one of:
//!
//! ```text
//! "name"                          sort this group by `name`
//! ["field", "readable"]           lay out child groups in this order
//! { "by": "name", "order": "desc", "numeric": true,
//!   "attributes": "alphabetical", "children": ["field"] }
//! ```

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::xml::Element;

/// What a group of same-name siblings is ordered by
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Criterion {
    /// `@name`: attribute value only
    Attribute(String),
    /// `#text`: the element's own text
    Text,
    /// Bare `name`: attribute value, falling back to the text of the first
    /// child element with that name
    Field(String),
}

impl Criterion {
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text == "#text" {
            return Some(Self::Text);
        }
        if let Some(attr) = text.strip_prefix('@') {
            return (!attr.is_empty()).then(|| Self::Attribute(attr.to_string()));
        }
        (!text.is_empty()).then(|| Self::Field(text.to_string()))
    }

    /// Extract the value this criterion orders `element` by
    pub fn value_of(&self, element: &Element) -> Option<String> {
        match self {
            Self::Attribute(name) => element.attributes.get(name).cloned(),
            Self::Text => element.text(),
            Self::Field(name) => element
                .attributes
                .get(name)
                .cloned()
                .or_else(|| element.find(name).and_then(Element::text)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    #[serde(rename = "desc", alias = "descending")]
    Descending,
}

/// How an element's attributes are reordered
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeOrder {
    Alphabetical,
    /// Listed names first in this order, the rest as encountered
    Priority(Vec<String>),
}

/// Sort treatment for one relevant key
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortRule {
    pub by: Option<Criterion>,
    pub direction: Direction,
    pub numeric: bool,
    pub attributes: Option<AttributeOrder>,
    /// Priority order of child groups (by element name)
    pub children: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleObject {
    #[serde(default)]
    by: Option<String>,
    #[serde(default)]
    order: Direction,
    #[serde(default)]
    numeric: bool,
    #[serde(default)]
    attributes: Option<AttributeOrderValue>,
    #[serde(default)]
    children: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AttributeOrderValue {
    Keyword(AttributeKeyword),
    Priority(Vec<String>),
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum AttributeKeyword {
    Alphabetical,
}

impl SortRule {
    pub fn by(criterion: &str) -> Option<Self> {
        Some(Self {
            by: Some(Criterion::parse(criterion)?),
            ..Self::default()
        })
    }

    pub fn children<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            children: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn descending(mut self) -> Self {
        self.direction = Direction::Descending;
        self
    }

    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    pub fn with_attributes(mut self, order: AttributeOrder) -> Self {
        self.attributes = Some(order);
        self
    }

    /// Interpret one `relevantKeys` entry. `None` means the entry is
    /// ill-shaped and the key gets no ordering.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(criterion) => Self::by(criterion),
            JsonValue::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(Self::children),
            JsonValue::Object(_) => {
                let object: RuleObject = serde_json::from_value(value.clone()).ok()?;
                let by = match object.by {
                    Some(by) => Some(Criterion::parse(&by)?),
                    None => None,
                };
                let attributes = object.attributes.map(|order| match order {
                    AttributeOrderValue::Keyword(AttributeKeyword::Alphabetical) => {
                        AttributeOrder::Alphabetical
                    }
                    AttributeOrderValue::Priority(names) => AttributeOrder::Priority(names),
                });
                Some(Self {
                    by,
                    direction: object.order,
                    numeric: object.numeric,
                    attributes,
                    children: object.children,
                })
            }
            JsonValue::Null | JsonValue::Bool(_) | JsonValue::Number(_) => None,
        }
    }
}
