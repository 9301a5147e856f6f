use chrono::{DateTime, Utc};
use domain::{Comment, CommentId};
use sqlx::FromRow;

#[derive(FromRow)]
pub struct SqlComment {
    pub id: String,
    pub parent_id: Option<String>,
    pub page_id: String,
    pub domain: String,
    pub page_url: String,
    pub author: String,
    pub email: String,
    pub gravatar: String,
    pub body: String,
    pub is_verified: bool,
    pub secret: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SqlComment> for Comment {
    fn from(sql: SqlComment) -> Self {
        Comment {
            id: CommentId::new_unchecked(sql.id),
            parent_id: sql.parent_id.map(CommentId::new_unchecked),
            page_id: sql.page_id,
            domain: sql.domain,
            page_url: sql.page_url,
            author: sql.author,
            email: sql.email,
            gravatar: sql.gravatar,
            body: sql.body,
            is_verified: sql.is_verified,
            secret: sql.secret,
            created_at: sql.created_at,
            updated_at: sql.updated_at,
        }
    }
}

/// One row of the parent/reply join. Reply columns are NULL for a parent
/// without replies.
#[derive(FromRow)]
pub struct SqlThreadRow {
    #[sqlx(flatten)]
    pub parent: SqlComment,
    pub reply_id: Option<String>,
    pub reply_parent_id: Option<String>,
    pub reply_page_id: Option<String>,
    pub reply_domain: Option<String>,
    pub reply_page_url: Option<String>,
    pub reply_author: Option<String>,
    pub reply_email: Option<String>,
    pub reply_gravatar: Option<String>,
    pub reply_body: Option<String>,
    pub reply_is_verified: Option<bool>,
    pub reply_secret: Option<String>,
    pub reply_created_at: Option<DateTime<Utc>>,
    pub reply_updated_at: Option<DateTime<Utc>>,
}

impl SqlThreadRow {
    pub fn split(self) -> (SqlComment, Option<SqlComment>) {
        let reply = match (self.reply_id, self.reply_created_at, self.reply_updated_at) {
            (Some(id), Some(created_at), Some(updated_at)) => Some(SqlComment {
                id,
                parent_id: self.reply_parent_id,
                page_id: self.reply_page_id.unwrap_or_default(),
                domain: self.reply_domain.unwrap_or_default(),
                page_url: self.reply_page_url.unwrap_or_default(),
                author: self.reply_author.unwrap_or_default(),
                email: self.reply_email.unwrap_or_default(),
                gravatar: self.reply_gravatar.unwrap_or_default(),
                body: self.reply_body.unwrap_or_default(),
                is_verified: self.reply_is_verified.unwrap_or(false),
                secret: self.reply_secret.unwrap_or_default(),
                created_at,
                updated_at,
            }),
            _ => None,
        };
        (self.parent, reply)
    }
}
