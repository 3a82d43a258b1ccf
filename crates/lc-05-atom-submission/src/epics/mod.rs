//! Epics of the submission flow.

pub mod apply_stored;
pub mod find_node;
pub mod submit;

pub use apply_stored::ApplyStoredAtomsEpic;
pub use find_node::FindANodeEpic;
pub use submit::{SubmitAtomEpic, DEFAULT_SUBMISSION_TIMEOUT};
