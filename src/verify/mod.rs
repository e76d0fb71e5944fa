pub mod invariants;

pub use invariants::{check_record, check_snapshot, InvariantViolation};
