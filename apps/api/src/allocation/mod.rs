// Seat allocation engine.
// Request flow: policy validation → cohort selection → bench filling → ledger append.
// Everything here works on request-scoped copies of the catalog; nothing is shared between runs.

pub mod allocator;
pub mod cohort;
pub mod handlers;
pub mod policy;
pub mod student_id;

use rand::Rng;
use thiserror::Error;

use crate::models::catalog::Catalog;
use crate::models::exam::{ExamFormatError, ExamWindow};

pub use allocator::{AllocationPlan, AllocationTotals, SeatAllocator};
pub use cohort::select_cohort;
pub use policy::Policy;

/// Rejections raised before any seat is assigned. Never retried.
#[derive(Debug, Error, PartialEq)]
pub enum AllocationError {
    #[error(transparent)]
    ExamFormat(#[from] ExamFormatError),

    #[error("number_of_branches must be 1 or 2, got {0}")]
    UnsupportedBranchesPerRoom(u32),

    #[error("single_child seating cannot be combined with two branches per room")]
    SingleChildWithPairedBranches,
}

/// Validates the request, selects the cohort, and produces the full seating plan.
///
/// Nothing is persisted here; the caller appends `plan.entries` to the ledger
/// once the run has completed.
pub fn run_allocation<R: Rng>(
    catalog: &Catalog,
    policy: &Policy,
    toe: &str,
    doe: &str,
    rng: &mut R,
) -> Result<AllocationPlan, AllocationError> {
    let window = ExamWindow::parse(toe, doe)?;
    let allocator = SeatAllocator::from_policy(policy)?;
    let selection = select_cohort(catalog, policy, rng);
    Ok(allocator.allocate(&selection, &window))
}
