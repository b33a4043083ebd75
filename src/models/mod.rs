pub mod notification;
pub mod session;
pub mod summary;

pub use notification::{Category, Lane, Notification, Priority};
pub use session::FocusSession;
pub use summary::SessionSummary;
