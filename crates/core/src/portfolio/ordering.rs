//! Display ordering for collections.

use std::cmp::Ordering;

use super::portfolio_model::PhotoCollection;

fn has_manual_order(collections: &[PhotoCollection]) -> bool {
    collections.iter().any(|c| c.order.is_some())
}

/// Collections in the order the gallery shows them.
///
/// A manual `order` on any collection switches the whole list to manual
/// ordering (missing positions count as 0). Otherwise newest year first,
/// ties broken by title.
pub fn sort_for_display(collections: &[PhotoCollection]) -> Vec<PhotoCollection> {
    let mut sorted = collections.to_vec();
    if has_manual_order(collections) {
        sorted.sort_by_key(|c| c.order.unwrap_or(0));
    } else {
        sorted.sort_by(|a, b| match b.year.cmp(&a.year) {
            Ordering::Equal => a.title.cmp(&b.title),
            other => other,
        });
    }
    sorted
}

/// Moves one collection within the display order and renumbers every `order`.
///
/// Returns `None` when either index is out of range or nothing would move.
pub fn reorder_collections(
    collections: &[PhotoCollection],
    from: usize,
    to: usize,
) -> Option<Vec<PhotoCollection>> {
    let len = collections.len();
    if from >= len || to >= len || from == to {
        return None;
    }

    let mut reordered = sort_for_display(collections);
    let moved = reordered.remove(from);
    reordered.insert(to, moved);
    for (index, collection) in reordered.iter_mut().enumerate() {
        collection.order = Some(index as i32);
    }
    Some(reordered)
}

/// Position for a newly created collection, if the list is manually ordered.
pub fn next_order_index(collections: &[PhotoCollection]) -> Option<i32> {
    if !has_manual_order(collections) {
        return None;
    }
    let max = collections
        .iter()
        .map(|c| c.order.unwrap_or(0))
        .fold(-1, i32::max);
    Some(max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(id: &str, title: &str, year: i32, order: Option<i32>) -> PhotoCollection {
        PhotoCollection {
            id: id.to_string(),
            title: title.to_string(),
            location: String::new(),
            year,
            description: String::new(),
            cover_image: String::new(),
            card_cover_image: None,
            cover_title: None,
            hover_location: None,
            photos: Vec::new(),
            created_at: String::new(),
            geo: None,
            order,
        }
    }

    fn ids(collections: &[PhotoCollection]) -> Vec<&str> {
        collections.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn sorts_by_year_then_title_without_manual_order() {
        let list = vec![
            collection("a", "Oslo", 2022, None),
            collection("b", "Berlin", 2024, None),
            collection("c", "Amsterdam", 2024, None),
        ];
        assert_eq!(ids(&sort_for_display(&list)), vec!["c", "b", "a"]);
    }

    #[test]
    fn manual_order_wins_over_year() {
        let list = vec![
            collection("a", "Oslo", 2022, Some(1)),
            collection("b", "Berlin", 2024, Some(2)),
            collection("c", "Amsterdam", 2024, None),
        ];
        assert_eq!(ids(&sort_for_display(&list)), vec!["c", "a", "b"]);
    }

    #[test]
    fn reorder_moves_and_renumbers() {
        let list = vec![
            collection("a", "A", 2025, None),
            collection("b", "B", 2024, None),
            collection("c", "C", 2023, None),
        ];
        let moved = reorder_collections(&list, 2, 0).expect("moved");
        assert_eq!(ids(&moved), vec!["c", "a", "b"]);
        let orders: Vec<_> = moved.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn reorder_rejects_out_of_range_and_noop() {
        let list = vec![collection("a", "A", 2025, None), collection("b", "B", 2024, None)];
        assert!(reorder_collections(&list, 0, 2).is_none());
        assert!(reorder_collections(&list, 1, 1).is_none());
    }

    #[test]
    fn next_order_index_follows_manual_order() {
        let unordered = vec![collection("a", "A", 2025, None)];
        assert_eq!(next_order_index(&unordered), None);

        let ordered = vec![
            collection("a", "A", 2025, Some(4)),
            collection("b", "B", 2024, None),
        ];
        assert_eq!(next_order_index(&ordered), Some(5));
    }
}
