//! Synthetic catalog for local runs and demos.
//!
//! Four blocks, each paired with one branch. Student ids follow the
//! `<yy>EG<branch code><section><NN>` layout that `allocation::student_id` decodes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::catalog::{Block, Branch, Catalog, Class, Room, SEATS_PER_BENCH};

const ROWS: u32 = 8;
const COLUMNS: u32 = 3;
const ROOMS_PER_BLOCK: u32 = 5;
const SECTIONS: [&str; 5] = ["A", "B", "C", "D", "E"];
const YEARS: u32 = 4;
/// Admission year (two digits) of first-year students.
const FIRST_YEAR_INTAKE: u32 = 24;

/// (block, branch name, branch code)
const LAYOUT: [(&str, &str, &str); 4] = [
    ("A", "CSE", "105"),
    ("B", "AIML", "106"),
    ("C", "CS", "107"),
    ("D", "ECE", "108"),
];

/// Deterministic synthetic catalog for `seed`.
pub fn synthetic_catalog(seed: u64) -> Catalog {
    generate_catalog(&mut StdRng::seed_from_u64(seed))
}

pub fn generate_catalog<R: Rng>(rng: &mut R) -> Catalog {
    let mut catalog = Catalog::default();

    for (block, branch, code) in LAYOUT {
        let rooms = (1..=ROOMS_PER_BLOCK)
            .map(|i| Room {
                id: i,
                room_type: "classroom".to_string(),
                capacity: ROWS * COLUMNS * SEATS_PER_BENCH,
                room_number: format!("{block}-{i:02}"),
                rows: ROWS,
                columns: COLUMNS,
            })
            .collect();
        catalog.blocks.push(Block {
            name: block.to_string(),
            rooms,
        });

        let mut classes = Vec::new();
        for year in 1..=YEARS {
            let prefix = format!("{}EG{}", FIRST_YEAR_INTAKE + 1 - year, code);
            for section in SECTIONS {
                let size = rng.gen_range(55..=66);
                classes.push(Class {
                    class_name: format!("{branch}-{section}"),
                    year,
                    branch: branch.to_string(),
                    student_ids: (1..=size)
                        .map(|n| format!("{prefix}{section}{n:02}"))
                        .collect(),
                });
            }
        }
        catalog.branches.push(Branch {
            name: branch.to_string(),
            classes,
        });
    }

    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::validate_catalog;

    #[test]
    fn test_synthetic_catalog_is_valid() {
        let catalog = synthetic_catalog(7);
        assert_eq!(validate_catalog(&catalog), Ok(()));
        assert_eq!(catalog.blocks.len(), 4);
        assert_eq!(catalog.blocks[0].rooms[0].room_number, "A-01");
        assert_eq!(catalog.blocks[0].rooms[0].capacity, 48);
    }

    #[test]
    fn test_synthetic_catalog_is_reproducible() {
        assert_eq!(synthetic_catalog(42), synthetic_catalog(42));
    }

    #[test]
    fn test_student_ids_encode_intake_and_section() {
        let catalog = synthetic_catalog(1);
        let cse = catalog.branch("CSE").unwrap();
        let second_year_b = cse
            .classes
            .iter()
            .find(|c| c.year == 2 && c.class_name == "CSE-B")
            .unwrap();
        assert_eq!(second_year_b.student_ids[0], "23EG105B01");
        assert!((55..=66).contains(&second_year_b.student_ids.len()));
    }
}
