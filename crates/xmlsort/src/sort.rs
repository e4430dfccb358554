//! The sorting engine
//!
//! Walks the tree depth-first and reorders sibling elements and attributes
//! according to a [`SortConfig`]. Sorting is a pure function of the tree and
//! the configuration and is idempotent.
//!
//! Rules per element, after its descendants have been sorted:
//!
//! - an element whose key is a non-sort key keeps its attribute and child
//!   order; its descendants are still sorted
//! - attributes follow the element rule's `attributes` order, except those
//!   named in the non-sort keys, which keep their positions
//! - text, CDATA, comments and non-sort child elements keep their slots
//! - the other children are grouped by name; with a `children` priority list
//!   the groups are laid out in that order, otherwise each group stays in the
//!   slots it already occupied
//! - members of a group whose rule has a criterion are stably sorted by it

mod key;
mod slots;

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::config::{AttributeOrder, SortConfig, SortRule};
use crate::xml::{Content, Document, Element};

pub use key::compare;

/// Sort a whole document
#[instrument(skip_all, fields(root = %document.root.name))]
pub fn sort(document: Document, config: &SortConfig) -> Document {
    debug!(
        relevant_keys = config.relevant_keys().count(),
        non_sort_keys = config.non_sort_keys().count(),
        "sorting document"
    );
    Sorter::new(config).sort_document(document)
}

/// Sort a single element subtree, treating it as the root
pub fn sort_element(element: Element, config: &SortConfig) -> Element {
    Sorter::new(config).sort_root(element)
}

#[derive(Clone, Copy, Debug)]
pub struct Sorter<'c> {
    config: &'c SortConfig,
}

/// Same-name siblings with their slots among the free children
struct Group<'c> {
    rule: Option<&'c SortRule>,
    slots: Vec<usize>,
    members: Vec<Content>,
}

impl<'c> Sorter<'c> {
    pub const fn new(config: &'c SortConfig) -> Self {
        Self { config }
    }

    pub fn sort_document(&self, document: Document) -> Document {
        Document {
            root: self.sort_root(document.root),
            ..document
        }
    }

    pub fn sort_root(&self, root: Element) -> Element {
        let mut path = root.name.clone();
        self.sort_element(root, &mut path)
    }

    fn sort_element(&self, element: Element, path: &mut String) -> Element {
        let Element {
            name,
            attributes,
            children,
        } = element;

        let children: Vec<Content> = children
            .into_iter()
            .map(|child| match child {
                Content::Element(child) => {
                    let len = path.len();
                    path.push('/');
                    path.push_str(&child.name);
                    let sorted = self.sort_element(child, path);
                    path.truncate(len);
                    Content::Element(sorted)
                }
                other => other,
            })
            .collect();

        if self.config.is_non_sort(path, &name) {
            return Element {
                name,
                attributes,
                children,
            };
        }

        let rule = self.config.rule_for(path, &name);
        let attributes = self.order_attributes(attributes, rule);
        let children = self.order_children(children, rule, path);

        Element {
            name,
            attributes,
            children,
        }
    }

    fn order_attributes(
        &self,
        attributes: IndexMap<String, String>,
        rule: Option<&SortRule>,
    ) -> IndexMap<String, String> {
        let Some(order) = rule.and_then(|rule| rule.attributes.as_ref()) else {
            return attributes;
        };

        let entries: Vec<(String, String)> = attributes.into_iter().collect();
        slots::reorder_unpinned(
            entries,
            |(name, _)| self.config.is_non_sort_attribute(name),
            |mut free| {
                match order {
                    AttributeOrder::Alphabetical => free.sort_by(|a, b| a.0.cmp(&b.0)),
                    AttributeOrder::Priority(names) => {
                        slots::sort_by_priority(&mut free, names, |(name, _)| Some(name.as_str()));
                    }
                }
                free
            },
        )
        .into_iter()
        .collect()
    }

    fn order_children(
        &self,
        children: Vec<Content>,
        rule: Option<&SortRule>,
        path: &str,
    ) -> Vec<Content> {
        let priority = rule.map(|rule| rule.children.as_slice()).unwrap_or_default();

        slots::reorder_unpinned(
            children,
            |child| match child {
                Content::Element(element) => {
                    let child_path = format!("{path}/{}", element.name);
                    self.config.is_non_sort(&child_path, &element.name)
                }
                Content::Text(_) | Content::CData(_) | Content::Comment(_) => true,
            },
            |free| self.arrange(free, priority, path),
        )
    }

    /// Arrange the free children: sort within groups, then either lay groups
    /// out by priority or put each group back into its own slots.
    fn arrange(&self, free: Vec<Content>, priority: &[String], path: &str) -> Vec<Content> {
        let len = free.len();
        let mut groups: IndexMap<Option<String>, Group<'c>> = IndexMap::new();

        for (slot, child) in free.into_iter().enumerate() {
            let name = child.as_element().map(|element| element.name.clone());
            let group = groups.entry(name).or_insert_with_key(|name| Group {
                rule: name.as_deref().and_then(|name| {
                    let child_path = format!("{path}/{name}");
                    self.config.rule_for(&child_path, name)
                }),
                slots: Vec::new(),
                members: Vec::new(),
            });
            group.slots.push(slot);
            group.members.push(child);
        }

        for group in groups.values_mut() {
            if let Some(rule) = group.rule {
                sort_group(&mut group.members, rule);
            }
        }

        if !priority.is_empty() {
            let mut ordered: Vec<(Option<String>, Group<'c>)> = groups.into_iter().collect();
            slots::sort_by_priority(&mut ordered, priority, |(name, _)| name.as_deref());
            return ordered
                .into_iter()
                .flat_map(|(_, group)| group.members)
                .collect();
        }

        let mut placed: Vec<Option<Content>> = std::iter::repeat_with(|| None).take(len).collect();
        for group in groups.into_values() {
            for (slot, member) in group.slots.into_iter().zip(group.members) {
                if let Some(target) = placed.get_mut(slot) {
                    *target = Some(member);
                }
            }
        }
        placed.into_iter().flatten().collect()
    }
}

/// Stable sort of one group by the rule's criterion
fn sort_group(members: &mut Vec<Content>, rule: &SortRule) {
    let Some(criterion) = rule.by.as_ref() else {
        return;
    };

    let mut keyed: Vec<(Option<String>, Content)> = members
        .drain(..)
        .map(|member| {
            let value = member
                .as_element()
                .and_then(|element| criterion.value_of(element));
            (value, member)
        })
        .collect();
    keyed.sort_by(|a, b| compare(a.0.as_deref(), b.0.as_deref(), rule));
    members.extend(keyed.into_iter().map(|(_, member)| member));
}
