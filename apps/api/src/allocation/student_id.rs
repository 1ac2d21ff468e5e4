//! Decoding of year and section from a student identifier.
//!
//! Ids look like `24EG105A01`: two-digit admission year, college code, branch
//! code, one-letter section, roll number. Ids that do not fit yield sentinels
//! and are still seated.

use tracing::debug;

/// Bucket for ids whose admission year cannot be read.
pub const UNKNOWN_YEAR: &str = "unknown";

const YEAR_WIDTH: usize = 2;
const SECTION_OFFSET: usize = 7;

pub fn admission_year(student_id: &str) -> Option<u32> {
    let digits = student_id.get(..YEAR_WIDTH)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn section(student_id: &str) -> Option<char> {
    student_id
        .chars()
        .nth(SECTION_OFFSET)
        .filter(|c| c.is_ascii_alphabetic())
}

/// Reporting key for the year distribution.
pub fn year_key(student_id: &str) -> String {
    match admission_year(student_id) {
        Some(year) => format!("{year:02}"),
        None => {
            debug!("Student id '{student_id}' has no readable admission year");
            UNKNOWN_YEAR.to_string()
        }
    }
}

/// Reporting key for the section distribution; empty when unreadable.
pub fn section_key(student_id: &str) -> String {
    match section(student_id) {
        Some(c) => c.to_string(),
        None => {
            debug!("Student id '{student_id}' has no readable section");
            String::new()
        }
    }
}
