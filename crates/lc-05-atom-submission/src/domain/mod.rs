//! Domain layer: staging errors and the handle returned for a user action.

pub mod errors;
pub mod result;

pub use errors::{FailedToStageAction, StageError, UserActionError};
pub use result::{PendingSubmission, ResultOfUserAction};
