pub mod adapter;
pub mod comment;
pub mod config;
pub mod error;
pub mod feedback_form;
pub mod notification;
pub mod page;
pub mod protocol;
pub mod server;
pub mod thread_view;
pub mod wallet;

pub use adapter::ContractAdapter;
pub use comment::{Comment, CommentThread, SharedThread};
pub use error::{AdapterError, ConfigError, FormError, ServerError};
pub use feedback_form::{
    submit_feedback, submit_typed_feedback, FeedbackForm, FeedbackSubmission, FormState,
};
pub use notification::{Notification, Notifier, Severity};
pub use wallet::WalletSession;
