//! Ordering of criterion values

use std::cmp::Ordering;

use crate::config::{Direction, SortRule};

/// Compare two criterion values under `rule`.
///
/// Missing values always go last, whatever the direction. With `numeric`,
/// values that parse as numbers come first in numeric order, followed by the
/// rest in string order.
pub fn compare(left: Option<&str>, right: Option<&str>, rule: &SortRule) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => {
            let ordering = if rule.numeric {
                compare_numeric(left, right)
            } else {
                left.cmp(right)
            };
            match rule.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        }
    }
}

fn compare_numeric(left: &str, right: &str) -> Ordering {
    match (left.trim().parse::<f64>(), right.trim().parse::<f64>()) {
        (Ok(l), Ok(r)) => l.total_cmp(&r),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => left.cmp(right),
    }
}
