//! Seat Allocator — maps cohorts onto benches room by room.
//!
//! A run stays active while a room is left and some cohort still has students,
//! and is done as soon as either runs out. Cohorts are read through index
//! cursors, so the selection itself is never mutated.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::allocation::cohort::{Cohort, Selection};
use crate::allocation::policy::{BenchOrder, Policy, SeatingMode};
use crate::allocation::student_id::{section_key, year_key};
use crate::allocation::AllocationError;
use crate::models::assignment::{LedgerEntry, SeatAssignment, Side};
use crate::models::catalog::Room;
use crate::models::exam::ExamWindow;

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomUsage {
    pub room: String,
    pub seated: usize,
    pub capacity: u32,
}

/// Display aggregate of a run. Derived from the entries; the entries are authoritative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllocationTotals {
    pub total_students: usize,
    pub rooms: Vec<RoomUsage>,
    pub by_year: BTreeMap<String, usize>,
    pub by_section: BTreeMap<String, usize>,
}

impl AllocationTotals {
    fn record(&mut self, student_id: &str) {
        self.total_students += 1;
        *self.by_year.entry(year_key(student_id)).or_insert(0) += 1;
        *self.by_section.entry(section_key(student_id)).or_insert(0) += 1;
    }
}

/// Result of a completed run: one ledger entry per room that seated anyone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllocationPlan {
    pub entries: Vec<LedgerEntry>,
    pub totals: AllocationTotals,
}

// ────────────────────────────────────────────────────────────────────────────
// Per-run cohort cursors
// ────────────────────────────────────────────────────────────────────────────

struct CohortQueues<'a> {
    cohorts: &'a [Cohort],
    cursors: Vec<usize>,
}

impl<'a> CohortQueues<'a> {
    fn new(cohorts: &'a [Cohort]) -> Self {
        CohortQueues {
            cohorts,
            cursors: vec![0; cohorts.len()],
        }
    }

    fn has_supply(&self, branch: usize) -> bool {
        self.cursors[branch] < self.cohorts[branch].students.len()
    }

    fn any_supply(&self) -> bool {
        (0..self.cohorts.len()).any(|b| self.has_supply(b))
    }

    fn pop(&mut self, branch: usize) -> Option<&'a str> {
        let cohorts = self.cohorts;
        let student = cohorts[branch].students.get(self.cursors[branch])?;
        self.cursors[branch] += 1;
        Some(student.as_str())
    }

    /// First branch at or after `start` (wrapping) with students left, never `exclude`.
    fn next_with_supply(&self, start: usize, exclude: Option<usize>) -> Option<usize> {
        let n = self.cohorts.len();
        (0..n)
            .map(|offset| (start + offset) % n)
            .find(|&b| Some(b) != exclude && self.has_supply(b))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Allocator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatAllocator {
    mode: SeatingMode,
    order: BenchOrder,
}

/// Collects a room's assignments and the run totals together.
struct RoomSheet<'w> {
    window: &'w ExamWindow,
    assignments: Vec<SeatAssignment>,
}

impl RoomSheet<'_> {
    fn seat(&mut self, student_id: &str, (row, column): (u32, u32), side: Side) {
        self.assignments.push(SeatAssignment {
            student_id: student_id.to_string(),
            row,
            column,
            side,
            toe: self.window.toe,
            doe: self.window.doe,
        });
    }
}

impl SeatAllocator {
    /// Fails on policy combinations that have no defined seating.
    pub fn from_policy(policy: &Policy) -> Result<Self, AllocationError> {
        Ok(SeatAllocator {
            mode: policy.seating_mode()?,
            order: policy.bench_order(),
        })
    }

    pub fn allocate(&self, selection: &Selection, window: &ExamWindow) -> AllocationPlan {
        let mut queues = CohortQueues::new(&selection.cohorts);
        let mut plan = AllocationPlan::default();

        for room in &selection.rooms {
            if !queues.any_supply() {
                break;
            }

            let mut sheet = RoomSheet {
                window,
                assignments: Vec::new(),
            };
            match self.mode {
                SeatingMode::SingleBranch { seats_per_bench } => {
                    self.fill_single_branch(room, seats_per_bench, &mut queues, &mut sheet)
                }
                SeatingMode::PairedBranches => self.fill_paired(room, &mut queues, &mut sheet),
            }

            if sheet.assignments.is_empty() {
                continue;
            }
            for assignment in &sheet.assignments {
                plan.totals.record(&assignment.student_id);
            }
            plan.totals.rooms.push(RoomUsage {
                room: room.room_number.clone(),
                seated: sheet.assignments.len(),
                capacity: room.capacity,
            });
            plan.entries.push(LedgerEntry {
                time: window.toe,
                room: room.room_number.clone(),
                assignments: sheet.assignments,
            });
        }

        info!(
            "Allocated {} of {} students across {} of {} rooms ({} seats) for {}",
            plan.totals.total_students,
            selection.student_count(),
            plan.entries.len(),
            selection.rooms.len(),
            selection.capacity(),
            window.toe
        );
        plan
    }

    /// The first branch with students takes the whole room, two (or one) per bench.
    fn fill_single_branch(
        &self,
        room: &Room,
        seats_per_bench: u32,
        queues: &mut CohortQueues<'_>,
        sheet: &mut RoomSheet<'_>,
    ) {
        let Some(branch) = queues.next_with_supply(0, None) else {
            return;
        };
        let sides = [Side::Left, Side::Right];

        for bench in 0..room.bench_count() {
            let position = self.order.position(bench, room);
            for side in sides.iter().take(seats_per_bench as usize) {
                match queues.pop(branch) {
                    Some(student) => sheet.seat(student, position, *side),
                    None => return,
                }
            }
        }
    }

    /// Every bench takes its left student from the next branch with supply and
    /// its right student from the branch after that. The cursor then rests on
    /// the right-hand branch, so it opens the next bench and the two branches
    /// swap sides. A bench stays half-filled when only one branch has students
    /// left.
    fn fill_paired(&self, room: &Room, queues: &mut CohortQueues<'_>, sheet: &mut RoomSheet<'_>) {
        let branch_count = queues.cohorts.len();
        let mut cursor = 0;

        for bench in 0..room.bench_count() {
            let Some(left) = queues.next_with_supply(cursor, None) else {
                return;
            };
            let position = self.order.position(bench, room);
            if let Some(student) = queues.pop(left) {
                sheet.seat(student, position, Side::Left);
            }
            cursor = (left + 1) % branch_count;

            if let Some(right) = queues.next_with_supply(cursor, Some(left)) {
                if let Some(student) = queues.pop(right) {
                    sheet.seat(student, position, Side::Right);
                }
                cursor = right;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::models::catalog::SEATS_PER_BENCH;

    fn room(number: &str, rows: u32, columns: u32) -> Room {
        Room {
            id: 0,
            room_type: "classroom".to_string(),
            capacity: rows * columns * SEATS_PER_BENCH,
            room_number: number.to_string(),
            rows,
            columns,
        }
    }

    fn cohort(branch: &str, count: usize) -> Cohort {
        Cohort {
            branch: branch.to_string(),
            students: (1..=count).map(|i| format!("{}{}", branch.to_lowercase(), i)).collect(),
        }
    }

    fn policy(branches_per_room: u32, row_wise: bool, single_child: bool) -> Policy {
        Policy {
            blocks: vec![],
            branches: vec![],
            years: vec![],
            room_types: vec![],
            branches_per_room,
            row_wise,
            single_child,
            internal_shuffle: false,
        }
    }

    fn window() -> ExamWindow {
        ExamWindow::parse("2024-05-10T10:00:00Z", "3h").unwrap()
    }

    fn run(policy: &Policy, rooms: Vec<Room>, cohorts: Vec<Cohort>) -> AllocationPlan {
        let selection = Selection { rooms, cohorts };
        SeatAllocator::from_policy(policy)
            .unwrap()
            .allocate(&selection, &window())
    }

    fn seats(entry: &LedgerEntry) -> Vec<(&str, u32, u32, Side)> {
        entry
            .assignments
            .iter()
            .map(|a| (a.student_id.as_str(), a.row, a.column, a.side))
            .collect()
    }

    #[test]
    fn test_single_branch_two_by_two_room() {
        let plan = run(&policy(1, true, false), vec![room("R1", 2, 2)], vec![cohort("A", 5)]);

        assert_eq!(plan.entries.len(), 1);
        assert_eq!(
            seats(&plan.entries[0]),
            vec![
                ("a1", 1, 1, Side::Left),
                ("a2", 1, 1, Side::Right),
                ("a3", 1, 2, Side::Left),
                ("a4", 1, 2, Side::Right),
                ("a5", 2, 1, Side::Left),
            ]
        );
        assert_eq!(
            plan.totals.rooms,
            vec![RoomUsage {
                room: "R1".to_string(),
                seated: 5,
                capacity: 8
            }]
        );
    }

    #[test]
    fn test_column_major_numbering() {
        let plan = run(&policy(1, false, false), vec![room("R1", 2, 2)], vec![cohort("A", 4)]);
        assert_eq!(
            seats(&plan.entries[0]),
            vec![
                ("a1", 1, 1, Side::Left),
                ("a2", 1, 1, Side::Right),
                ("a3", 2, 1, Side::Left),
                ("a4", 2, 1, Side::Right),
            ]
        );
    }

    #[test]
    fn test_single_branch_room_stops_when_branch_exhausted() {
        // A runs out in R1; B starts fresh in R2 rather than sharing R1.
        let plan = run(
            &policy(1, true, false),
            vec![room("R1", 2, 2), room("R2", 1, 1), room("R3", 1, 1)],
            vec![cohort("A", 3), cohort("B", 3)],
        );
        let rooms: Vec<_> = plan.entries.iter().map(|e| e.room.as_str()).collect();
        assert_eq!(rooms, vec!["R1", "R2", "R3"]);
        assert_eq!(plan.entries[0].assignments.len(), 3);
        assert_eq!(
            seats(&plan.entries[1]),
            vec![("b1", 1, 1, Side::Left), ("b2", 1, 1, Side::Right)]
        );
        assert_eq!(seats(&plan.entries[2]), vec![("b3", 1, 1, Side::Left)]);
    }

    #[test]
    fn test_single_child_seats_left_only() {
        let plan = run(&policy(1, true, true), vec![room("R1", 2, 2)], vec![cohort("A", 10)]);
        let entry = &plan.entries[0];
        assert_eq!(entry.assignments.len(), 4);
        assert!(entry.assignments.iter().all(|a| a.side == Side::Left));
        assert_eq!(plan.totals.total_students, 4);
    }

    #[test]
    fn test_paired_branches_alternate_sides() {
        let plan = run(
            &policy(2, true, false),
            vec![room("R1", 1, 3)],
            vec![cohort("A", 5), cohort("B", 5)],
        );
        assert_eq!(
            seats(&plan.entries[0]),
            vec![
                ("a1", 1, 1, Side::Left),
                ("b1", 1, 1, Side::Right),
                ("b2", 1, 2, Side::Left),
                ("a2", 1, 2, Side::Right),
                ("a3", 1, 3, Side::Left),
                ("b3", 1, 3, Side::Right),
            ]
        );
    }

    #[test]
    fn test_paired_two_branches_swap_sides_every_bench() {
        let plan = run(
            &policy(2, true, false),
            vec![room("R1", 1, 4)],
            vec![cohort("A", 5), cohort("B", 5)],
        );
        let order: Vec<_> = plan.entries[0]
            .assignments
            .iter()
            .map(|a| a.student_id.as_str())
            .collect();
        assert_eq!(order, vec!["a1", "b1", "b2", "a2", "a3", "b3", "b4", "a4"]);
    }

    #[test]
    fn test_paired_three_branches_rotate() {
        let plan = run(
            &policy(2, true, false),
            vec![room("R1", 1, 3)],
            vec![cohort("A", 5), cohort("B", 5), cohort("C", 5)],
        );
        let pairs: Vec<_> = plan.entries[0]
            .assignments
            .chunks(2)
            .map(|c| (c[0].student_id.as_str(), c[1].student_id.as_str()))
            .collect();
        assert_eq!(pairs, vec![("a1", "b1"), ("b2", "c1"), ("c2", "a2")]);
    }

    #[test]
    fn test_paired_half_fills_when_one_branch_left() {
        let plan = run(
            &policy(2, true, false),
            vec![room("R1", 2, 2)],
            vec![cohort("A", 4), cohort("B", 1)],
        );
        assert_eq!(
            seats(&plan.entries[0]),
            vec![
                ("a1", 1, 1, Side::Left),
                ("b1", 1, 1, Side::Right),
                ("a2", 1, 2, Side::Left),
                ("a3", 2, 1, Side::Left),
                ("a4", 2, 2, Side::Left),
            ]
        );
    }

    #[test]
    fn test_paired_benches_never_share_a_branch_while_two_have_supply() {
        let cohorts = vec![cohort("A", 30), cohort("B", 7), cohort("C", 12)];
        let branch_of = |id: &str| id.chars().next().unwrap();
        let plan = run(
            &policy(2, false, false),
            vec![room("R1", 4, 3), room("R2", 3, 3)],
            cohorts,
        );

        for entry in &plan.entries {
            let mut benches: BTreeMap<(u32, u32), Vec<&SeatAssignment>> = BTreeMap::new();
            for a in &entry.assignments {
                benches.entry((a.row, a.column)).or_default().push(a);
            }
            for occupants in benches.values() {
                if let [left, right] = occupants.as_slice() {
                    assert_eq!(left.side, Side::Left);
                    assert_eq!(right.side, Side::Right);
                    assert_ne!(
                        branch_of(left.student_id.as_str()),
                        branch_of(right.student_id.as_str())
                    );
                }
            }
        }
    }

    #[test]
    fn test_never_exceeds_capacity_and_never_repeats_students() {
        let rooms = vec![room("R1", 2, 3), room("R2", 1, 2), room("R3", 3, 1)];
        let capacity: u32 = rooms.iter().map(|r| r.capacity).sum();
        for p in [policy(1, true, false), policy(1, false, true), policy(2, true, false)] {
            let plan = run(&p, rooms.clone(), vec![cohort("A", 20), cohort("B", 20)]);
            let ids: Vec<_> = plan
                .entries
                .iter()
                .flat_map(|e| e.assignments.iter().map(|a| a.student_id.clone()))
                .collect();
            assert!(ids.len() as u32 <= capacity);
            assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());

            for entry in &plan.entries {
                let triples: HashSet<_> =
                    entry.assignments.iter().map(|a| (a.row, a.column, a.side)).collect();
                assert_eq!(triples.len(), entry.assignments.len());
            }
        }
    }

    #[test]
    fn test_empty_inputs_yield_no_entries() {
        let p = policy(2, true, false);
        assert_eq!(run(&p, vec![], vec![cohort("A", 3)]), AllocationPlan::default());
        assert_eq!(run(&p, vec![room("R1", 1, 1)], vec![]), AllocationPlan::default());
        assert_eq!(
            run(&p, vec![room("R1", 1, 1)], vec![cohort("A", 0)]),
            AllocationPlan::default()
        );
    }

    #[test]
    fn test_identical_inputs_give_identical_plans() {
        let rooms = vec![room("R1", 3, 3), room("R2", 2, 2)];
        let cohorts = vec![cohort("A", 11), cohort("B", 9)];
        let p = policy(2, true, false);
        let first = serde_json::to_vec(&run(&p, rooms.clone(), cohorts.clone()).entries).unwrap();
        let second = serde_json::to_vec(&run(&p, rooms, cohorts).entries).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_totals_use_sentinels_for_malformed_ids() {
        let cohorts = vec![Cohort {
            branch: "CSE".to_string(),
            students: vec!["24EG105A01".to_string(), "x".to_string(), "23EG105B07".to_string()],
        }];
        let plan = run(&policy(1, true, false), vec![room("R1", 2, 2)], cohorts);

        assert_eq!(plan.totals.total_students, 3);
        assert_eq!(plan.totals.by_year.get("24"), Some(&1));
        assert_eq!(plan.totals.by_year.get("23"), Some(&1));
        assert_eq!(plan.totals.by_year.get("unknown"), Some(&1));
        assert_eq!(plan.totals.by_section.get("A"), Some(&1));
        assert_eq!(plan.totals.by_section.get(""), Some(&1));
    }

    #[test]
    fn test_assignments_carry_exam_window() {
        let plan = run(&policy(1, true, false), vec![room("R1", 1, 1)], vec![cohort("A", 1)]);
        let a = &plan.entries[0].assignments[0];
        assert_eq!(a.toe, window().toe);
        assert_eq!(a.doe.to_string(), "3h0m0s");
        assert_eq!(plan.entries[0].time, window().toe);
    }
}
