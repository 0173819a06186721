//! Change recording for converted mapper statements
//!
//! Every statement whose text changed during a conversion gets its own
//! [`ChangeRecord`]: a unified diff of the trimmed original against the
//! trimmed replacement, addressed by document path and block position.

pub mod diff;
pub mod error;
pub mod record;

pub use diff::{ChangeSummary, unified_diff};
pub use error::{Error, Result};
pub use record::{BlockChange, ChangeRecord, record_changes};
