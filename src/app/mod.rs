//! Page-level control: capabilities, the active run, topics and resume.

pub mod error;
pub mod page;
pub mod rehydrate;

pub use error::RunError;
pub use page::{HostUpdatePage, PreparedRun, Sections, listing_error_text};
pub use rehydrate::{Resume, rehydrate};
