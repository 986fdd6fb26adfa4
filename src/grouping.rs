//! Category grouping for search results
//!
//! Groups keep the order in which each category first appears in the input,
//! and listings keep their input order inside a group.

use serde::Serialize;
use std::collections::HashMap;

use crate::types::ListingSummary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub listings: Vec<ListingSummary>,
}

/// Split a flat result list into one group per category.
pub fn group_by_category(listings: &[ListingSummary]) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for listing in listings {
        let slot = *index.entry(listing.category.as_str()).or_insert_with(|| {
            groups.push(CategoryGroup {
                category: listing.category.clone(),
                listings: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].listings.push(listing.clone());
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: u64, category: &str) -> ListingSummary {
        ListingSummary {
            id,
            title: format!("listing {id}"),
            description: String::new(),
            price: 10.0,
            currency: "USDT".into(),
            category: category.into(),
            seller: None,
            created_at: None,
            views: None,
        }
    }

    #[test]
    fn test_groups_follow_first_occurrence() {
        let input = vec![
            listing(1, "bot"),
            listing(2, "channel"),
            listing(3, "bot"),
            listing(4, "group"),
            listing(5, "channel"),
        ];
        let groups = group_by_category(&input);

        let order: Vec<&str> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(order, vec!["bot", "channel", "group"]);

        let ids: Vec<Vec<u64>> = groups
            .iter()
            .map(|g| g.listings.iter().map(|l| l.id).collect())
            .collect();
        assert_eq!(ids, vec![vec![1, 3], vec![2, 5], vec![4]]);
    }

    #[test]
    fn test_every_listing_lands_in_exactly_one_group() {
        let input: Vec<ListingSummary> = (0..40)
            .map(|i| listing(i, ["a", "b", "c", "d"][(i * 7 % 4) as usize]))
            .collect();
        let groups = group_by_category(&input);

        let mut seen: Vec<u64> = groups
            .iter()
            .flat_map(|g| {
                assert!(g.listings.iter().all(|l| l.category == g.category));
                g.listings.iter().map(|l| l.id)
            })
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_input_has_no_groups() {
        assert!(group_by_category(&[]).is_empty());
    }
}
