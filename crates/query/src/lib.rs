mod engine;
mod sqlite;
mod traits;

pub use engine::CommentQueryEngine;
pub use traits::CommentStore;
