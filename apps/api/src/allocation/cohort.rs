//! Cohort selection — narrows the catalog to the rooms and students a request asked for.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;

use crate::allocation::policy::Policy;
use crate::models::catalog::{Catalog, Room};

/// Students of one branch eligible for a run, in seating order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cohort {
    pub branch: String,
    pub students: Vec<String>,
}

/// Request-scoped copy of the rooms and cohorts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub rooms: Vec<Room>,
    /// Ordered by the policy's branch list.
    pub cohorts: Vec<Cohort>,
}

impl Selection {
    pub fn capacity(&self) -> u64 {
        self.rooms.iter().map(|r| u64::from(r.capacity)).sum()
    }

    pub fn student_count(&self) -> usize {
        self.cohorts.iter().map(|c| c.students.len()).sum()
    }
}

/// Builds the [`Selection`] for `policy`.
///
/// Rooms come from the requested blocks in catalog order, optionally narrowed
/// to the requested room types. Each branch's cohort is the concatenation of
/// its classes for the requested years, in class and roll order, shuffled
/// with `rng` when `internal_shuffle` is set. Repeated block or branch names
/// and repeated student ids are taken once.
pub fn select_cohort<R: Rng>(catalog: &Catalog, policy: &Policy, rng: &mut R) -> Selection {
    let mut rooms = Vec::new();
    for block_name in unique(&policy.blocks) {
        let Some(block) = catalog.block(block_name) else {
            warn!("Requested block '{block_name}' is not in the catalog");
            continue;
        };
        rooms.extend(
            block
                .rooms
                .iter()
                .filter(|r| policy.room_types.is_empty() || policy.room_types.contains(&r.room_type))
                .cloned(),
        );
    }

    let mut seen_students = HashSet::new();
    let mut cohorts = Vec::new();
    for branch_name in unique(&policy.branches) {
        let Some(branch) = catalog.branch(branch_name) else {
            warn!("Requested branch '{branch_name}' is not in the catalog");
            continue;
        };

        let mut students: Vec<String> = branch
            .classes
            .iter()
            .filter(|class| policy.years.contains(&class.year))
            .flat_map(|class| class.student_ids.iter())
            .filter(|id| seen_students.insert(id.as_str()))
            .cloned()
            .collect();

        if policy.internal_shuffle {
            students.shuffle(rng);
        }

        cohorts.push(Cohort {
            branch: branch.name.clone(),
            students,
        });
    }

    Selection { rooms, cohorts }
}

fn unique(names: &[String]) -> impl Iterator<Item = &str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(String::as_str)
        .filter(move |name| seen.insert(*name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::{Block, Branch, Class};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn room(number: &str, room_type: &str) -> Room {
        Room {
            id: 0,
            room_type: room_type.to_string(),
            capacity: 8,
            room_number: number.to_string(),
            rows: 2,
            columns: 2,
        }
    }

    fn class(branch: &str, year: u32, ids: &[&str]) -> Class {
        Class {
            class_name: format!("{branch}-{year}"),
            year,
            branch: branch.to_string(),
            student_ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn catalog() -> Catalog {
        Catalog {
            blocks: vec![
                Block {
                    name: "A".to_string(),
                    rooms: vec![room("A-01", "classroom"), room("A-02", "lab")],
                },
                Block {
                    name: "B".to_string(),
                    rooms: vec![room("B-01", "classroom")],
                },
            ],
            branches: vec![
                Branch {
                    name: "CSE".to_string(),
                    classes: vec![
                        class("CSE", 1, &["c1", "c2"]),
                        class("CSE", 2, &["c3"]),
                        class("CSE", 1, &["c4"]),
                    ],
                },
                Branch {
                    name: "ECE".to_string(),
                    classes: vec![class("ECE", 1, &["e1", "e2", "e3"])],
                },
            ],
        }
    }

    fn policy() -> Policy {
        Policy {
            blocks: vec!["B".to_string(), "A".to_string()],
            branches: vec!["ECE".to_string(), "CSE".to_string()],
            years: vec![1],
            room_types: vec![],
            branches_per_room: 1,
            row_wise: true,
            single_child: false,
            internal_shuffle: false,
        }
    }

    fn room_numbers(selection: &Selection) -> Vec<&str> {
        selection.rooms.iter().map(|r| r.room_number.as_str()).collect()
    }

    #[test]
    fn test_rooms_follow_requested_blocks() {
        let selection = select_cohort(&catalog(), &policy(), &mut StdRng::seed_from_u64(0));
        assert_eq!(room_numbers(&selection), vec!["B-01", "A-01", "A-02"]);
        assert_eq!(selection.capacity(), 24);
    }

    #[test]
    fn test_room_type_filter() {
        let mut p = policy();
        p.room_types = vec!["lab".to_string()];
        let selection = select_cohort(&catalog(), &p, &mut StdRng::seed_from_u64(0));
        assert_eq!(room_numbers(&selection), vec!["A-02"]);
    }

    #[test]
    fn test_cohorts_follow_policy_branch_order_and_years() {
        let selection = select_cohort(&catalog(), &policy(), &mut StdRng::seed_from_u64(0));
        assert_eq!(selection.cohorts.len(), 2);
        assert_eq!(selection.cohorts[0].branch, "ECE");
        assert_eq!(selection.cohorts[0].students, vec!["e1", "e2", "e3"]);
        assert_eq!(selection.cohorts[1].branch, "CSE");
        // year-2 class skipped, later year-1 class appended in catalog order
        assert_eq!(selection.cohorts[1].students, vec!["c1", "c2", "c4"]);
    }

    #[test]
    fn test_unknown_names_and_duplicates_ignored() {
        let mut p = policy();
        p.blocks = vec!["Z".to_string(), "B".to_string(), "B".to_string()];
        p.branches = vec!["CSE".to_string(), "MECH".to_string(), "CSE".to_string()];
        let selection = select_cohort(&catalog(), &p, &mut StdRng::seed_from_u64(0));
        assert_eq!(room_numbers(&selection), vec!["B-01"]);
        assert_eq!(selection.cohorts.len(), 1);
        assert_eq!(selection.student_count(), 3);
    }

    #[test]
    fn test_empty_selection_is_not_an_error() {
        let mut p = policy();
        p.blocks.clear();
        p.years = vec![9];
        let selection = select_cohort(&catalog(), &p, &mut StdRng::seed_from_u64(0));
        assert!(selection.rooms.is_empty());
        assert_eq!(selection.student_count(), 0);
    }

    #[test]
    fn test_shuffle_is_seeded_permutation() {
        let original: Vec<String> = (0..40).map(|i| format!("s{i}")).collect();
        let refs: Vec<&str> = original.iter().map(String::as_str).collect();
        let mut big = catalog();
        big.branches[0].classes = vec![class("CSE", 1, &refs)];
        let mut p = policy();
        p.branches = vec!["CSE".to_string()];
        p.internal_shuffle = true;

        let first = select_cohort(&big, &p, &mut StdRng::seed_from_u64(11));
        let second = select_cohort(&big, &p, &mut StdRng::seed_from_u64(11));
        assert_eq!(first, second, "same seed must give the same order");

        assert_ne!(first.cohorts[0].students, original);
        let mut sorted = first.cohorts[0].students.clone();
        sorted.sort();
        let mut expected = original.clone();
        expected.sort();
        assert_eq!(sorted, expected);
    }
}
