//! Submission checks
//!
//! # Validators
//! 1. **set_comparator** - Symmetric set difference with truncated reporting
//! 2. **structural** - Column presence (test) or exact shape/order (ground truth)
//! 3. **content** - Missing values, class labels, duplicate identifiers
//!
//! Every check is a pure function of its inputs returning findings; none of
//! them stops another from running.

pub mod content;
pub mod set_comparator;
pub mod structural;

pub use content::ContentValidator;
pub use set_comparator::{compare, SetDifference, TRUNCATION_LIMIT};
pub use structural::StructuralValidator;
