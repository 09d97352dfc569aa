//! Domain records for Retail Ops.
//!
//! Each record is a projection of a Notion database row. Records implement
//! [`NotionRecord`], which maps a [`Page`](retail_notion::Page) to the record
//! (with default fallbacks for missing properties) and back to
//! [`Properties`](retail_notion::Properties). The [`record`] module provides
//! typed `find`/`list`/`insert`/`save`/`archive` helpers over any
//! [`RecordStore`](retail_notion::RecordStore).

pub mod comment;
pub mod finance;
pub mod form;
pub mod message;
pub mod notification;
pub mod record;
pub mod store;
pub mod task;
pub mod user;
pub mod validate;

pub use comment::Comment;
pub use finance::{CategoryTotal, EntryKind, FinanceSummary, FinancialEntry};
pub use form::{FieldKind, Form, FormField, FormSubmission};
pub use message::Message;
pub use notification::Notification;
pub use record::NotionRecord;
pub use store::Store;
pub use task::{Task, TaskPriority, TaskStatus};
pub use user::{Role, User};
