//! Reordering a sequence while some items stay in their slots

/// Reorder `items`, keeping every pinned item at its index.
///
/// The unpinned items are handed to `arrange` in their original relative
/// order; its result fills the free slots from left to right. `arrange` must
/// return as many items as it receives.
pub fn reorder_unpinned<T, P, A>(items: Vec<T>, is_pinned: P, arrange: A) -> Vec<T>
where
    P: Fn(&T) -> bool,
    A: FnOnce(Vec<T>) -> Vec<T>,
{
    let mut layout: Vec<Option<T>> = Vec::with_capacity(items.len());
    let mut free = Vec::new();
    for item in items {
        if is_pinned(&item) {
            layout.push(Some(item));
        } else {
            layout.push(None);
            free.push(item);
        }
    }

    if free.len() < 2 {
        let mut free = free.into_iter();
        return layout
            .into_iter()
            .filter_map(|slot| slot.or_else(|| free.next()))
            .collect();
    }

    let mut arranged = arrange(free).into_iter();
    layout
        .into_iter()
        .filter_map(|slot| slot.or_else(|| arranged.next()))
        .collect()
}

/// Stable sort of `items` by rank in `priority`; unlisted items keep their
/// relative order after all listed ones.
pub fn sort_by_priority<T, K>(items: &mut [T], priority: &[String], key: K)
where
    K: Fn(&T) -> Option<&str>,
{
    items.sort_by_key(|item| {
        key(item)
            .and_then(|name| priority.iter().position(|p| p == name))
            .unwrap_or(priority.len())
    });
}
