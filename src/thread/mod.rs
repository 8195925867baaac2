//! Comment thread presentation: tree assembly, collapse state, and
//! duplicate-submission guarding.

mod collapse;
mod submit;
mod tree;

pub use collapse::CollapseState;
pub use submit::{SubmissionGuard, SubmitError, SubmitOutcome};
pub use tree::{build_thread, computed_levels};
