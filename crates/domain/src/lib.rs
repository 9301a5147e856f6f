mod error;
mod models;
mod projection;
pub mod query;

pub use error::QueryError;
pub use models::{Comment, CommentId, Thread, Viewer};
pub use projection::{
    CommentTree, CommentView, Owner, PageMeta, PagedComments, PagedReplies, TopLevelComment,
};
pub use query::{PageFilter, Pagination, Selector, SortOrder};
