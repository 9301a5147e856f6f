use std::collections::HashMap;

use crate::{
    models::{SqlComment, SqlThreadRow},
    Db,
};
use domain::{Comment, CommentId, PageFilter, Pagination, Selector, SortOrder, Thread};
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

const COMMENT_COLUMNS: &str = "id, parent_id, page_id, domain, page_url, author, email, \
     gravatar, body, is_verified, secret, created_at, updated_at";

fn push_page_filter(qb: &mut QueryBuilder<'_, Sqlite>, alias: &str, filter: &PageFilter) {
    match filter {
        PageFilter::Page(page_id) => {
            qb.push(format!(" AND {alias}page_id = "))
                .push_bind(page_id.clone());
        }
        PageFilter::Domain(domain) => {
            qb.push(format!(" AND {alias}domain = "))
                .push_bind(domain.clone());
        }
    }
}

fn push_selector(qb: &mut QueryBuilder<'_, Sqlite>, selector: &Selector) {
    match selector {
        Selector::TopLevel(filter) => {
            qb.push(" WHERE parent_id IS NULL");
            push_page_filter(qb, "", filter);
        }
        Selector::RepliesTo(parent_id) => {
            qb.push(" WHERE parent_id = ")
                .push_bind(parent_id.as_str().to_owned());
        }
    }
}

fn order_keyword(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

fn to_sql_int(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl Db {
    pub async fn insert_comment(&self, c: &Comment) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (
                id, parent_id, page_id, domain, page_url,
                author, email, gravatar, body,
                is_verified, secret, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(c.id.as_str())
        .bind(c.parent_id.as_ref().map(CommentId::as_str))
        .bind(&c.page_id)
        .bind(&c.domain)
        .bind(&c.page_url)
        .bind(&c.author)
        .bind(&c.email)
        .bind(&c.gravatar)
        .bind(&c.body)
        .bind(c.is_verified)
        .bind(&c.secret)
        .bind(c.created_at)
        .bind(c.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn count_comments(&self, selector: &Selector) -> anyhow::Result<u64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM comments");
        push_selector(&mut qb, selector);

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    pub async fn find_comments(
        &self,
        selector: &Selector,
        order: SortOrder,
        page: Pagination,
    ) -> anyhow::Result<Vec<Comment>> {
        let mut qb = QueryBuilder::new(format!("SELECT {COMMENT_COLUMNS} FROM comments"));
        push_selector(&mut qb, selector);
        // id breaks ties between comments created in the same instant
        let dir = order_keyword(order);
        qb.push(format!(" ORDER BY created_at {dir}, id {dir} LIMIT "))
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(to_sql_int(page.skip()));

        let rows: Vec<SqlComment> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Reply counts for a batch of parents in a single grouped statement.
    /// Parents without replies are absent from the map.
    pub async fn count_replies_by_parent(
        &self,
        parent_ids: &[CommentId],
    ) -> anyhow::Result<HashMap<CommentId, u64>> {
        if parent_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb = QueryBuilder::new(
            "SELECT parent_id, COUNT(*) AS count FROM comments WHERE parent_id IN (",
        );
        let mut ids = qb.separated(", ");
        for id in parent_ids {
            ids.push_bind(id.as_str().to_owned());
        }
        ids.push_unseparated(") GROUP BY parent_id");

        let rows: Vec<(String, i64)> = qb.build_query_as().fetch_all(&self.pool).await?;
        debug!("Grouped reply counts: {} of {} parents", rows.len(), parent_ids.len());

        Ok(rows
            .into_iter()
            .map(|(id, count)| (CommentId::new_unchecked(id), count.max(0) as u64))
            .collect())
    }

    /// Top-level comments newest-first, each joined with all of its direct
    /// replies newest-first, in one statement.
    pub async fn find_threads(&self, filter: &PageFilter) -> anyhow::Result<Vec<Thread>> {
        let mut qb = QueryBuilder::new(
            r#"
            SELECT
                p.id, p.parent_id, p.page_id, p.domain, p.page_url,
                p.author, p.email, p.gravatar, p.body,
                p.is_verified, p.secret, p.created_at, p.updated_at,
                r.id AS reply_id,
                r.parent_id AS reply_parent_id,
                r.page_id AS reply_page_id,
                r.domain AS reply_domain,
                r.page_url AS reply_page_url,
                r.author AS reply_author,
                r.email AS reply_email,
                r.gravatar AS reply_gravatar,
                r.body AS reply_body,
                r.is_verified AS reply_is_verified,
                r.secret AS reply_secret,
                r.created_at AS reply_created_at,
                r.updated_at AS reply_updated_at
            FROM comments p
            LEFT JOIN comments r ON r.parent_id = p.id
            WHERE p.parent_id IS NULL"#,
        );
        push_page_filter(&mut qb, "p.", filter);
        qb.push(" ORDER BY p.created_at DESC, p.id DESC, r.created_at DESC, r.id DESC");

        let rows: Vec<SqlThreadRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        let mut threads: Vec<Thread> = Vec::new();
        for row in rows {
            let (parent, reply) = row.split();
            let same_parent = threads
                .last()
                .is_some_and(|t| t.parent.id.as_str() == parent.id);
            if !same_parent {
                threads.push(Thread {
                    parent: parent.into(),
                    replies: Vec::new(),
                });
            }
            if let (Some(reply), Some(thread)) = (reply, threads.last_mut()) {
                thread.replies.push(reply.into());
            }
        }
        Ok(threads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn id(n: u8) -> CommentId {
        CommentId::parse(&format!("{:024x}", n)).unwrap()
    }

    fn comment(n: u8, parent: Option<u8>, page: &str, minutes: i64) -> Comment {
        Comment {
            id: id(n),
            parent_id: parent.map(id),
            page_id: page.to_string(),
            domain: page.split('/').next().unwrap().to_string(),
            page_url: format!("https://{page}"),
            author: format!("author-{n}"),
            email: format!("user{n}@example.com"),
            gravatar: format!("{:032x}", n),
            body: format!("body {n}"),
            is_verified: n % 2 == 0,
            secret: format!("secret-{n}"),
            created_at: at(minutes),
            updated_at: at(minutes),
        }
    }

    async fn seeded() -> Db {
        let db = Db::new("sqlite::memory:").await.unwrap();
        for c in [
            comment(1, None, "a.com/post", 1),
            comment(2, Some(1), "a.com/post", 2),
            comment(3, None, "a.com/post", 3),
            comment(4, Some(1), "a.com/post", 4),
            comment(5, None, "a.com/other", 5),
            comment(6, None, "b.org/post", 6),
            comment(7, Some(3), "a.com/post", 7),
        ] {
            db.insert_comment(&c).await.unwrap();
        }
        db
    }

    fn top(page: &str) -> Selector {
        Selector::TopLevel(PageFilter::Page(page.into()))
    }

    fn ids(comments: &[Comment]) -> Vec<CommentId> {
        comments.iter().map(|c| c.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_round_trip_preserves_fields() {
        let db = seeded().await;
        let found = db
            .find_comments(&Selector::RepliesTo(id(1)), SortOrder::Asc, Pagination::default())
            .await
            .unwrap();
        assert_eq!(found[0], comment(2, Some(1), "a.com/post", 2));
    }

    #[tokio::test]
    async fn test_top_level_by_page_and_domain() {
        let db = seeded().await;

        let page = db
            .find_comments(&top("a.com/post"), SortOrder::Asc, Pagination::default())
            .await
            .unwrap();
        assert_eq!(ids(&page), vec![id(1), id(3)]);
        assert_eq!(db.count_comments(&top("a.com/post")).await.unwrap(), 2);

        let domain = Selector::TopLevel(PageFilter::Domain("a.com".into()));
        let found = db
            .find_comments(&domain, SortOrder::Desc, Pagination::default())
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![id(5), id(3), id(1)]);
        assert_eq!(db.count_comments(&domain).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_find_applies_skip_and_limit() {
        let db = seeded().await;
        let domain = Selector::TopLevel(PageFilter::Domain("a.com".into()));

        let second = db
            .find_comments(&domain, SortOrder::Asc, Pagination::new(1, 1))
            .await
            .unwrap();
        assert_eq!(ids(&second), vec![id(3)]);

        let beyond = db
            .find_comments(&domain, SortOrder::Asc, Pagination::new(10, u64::MAX))
            .await
            .unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn test_grouped_reply_counts() {
        let db = seeded().await;
        let counts = db
            .count_replies_by_parent(&[id(1), id(3), id(5)])
            .await
            .unwrap();
        assert_eq!(counts.get(&id(1)), Some(&2));
        assert_eq!(counts.get(&id(3)), Some(&1));
        assert_eq!(counts.get(&id(5)), None);

        assert!(db.count_replies_by_parent(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_threads_are_joined_newest_first() {
        let db = seeded().await;
        let threads = db
            .find_threads(&PageFilter::Page("a.com/post".into()))
            .await
            .unwrap();

        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].parent.id, id(3));
        assert_eq!(ids(&threads[0].replies), vec![id(7)]);
        assert_eq!(threads[1].parent.id, id(1));
        assert_eq!(ids(&threads[1].replies), vec![id(4), id(2)]);

        let lonely = db
            .find_threads(&PageFilter::Page("b.org/post".into()))
            .await
            .unwrap();
        assert_eq!(lonely.len(), 1);
        assert!(lonely[0].replies.is_empty());
    }

    #[tokio::test]
    async fn test_orphaned_replies_stay_listable() {
        let db = seeded().await;
        let orphan = comment(9, Some(200), "a.com/post", 9);
        db.insert_comment(&orphan).await.unwrap();

        let replies = db
            .find_comments(
                &Selector::RepliesTo(id(200)),
                SortOrder::Asc,
                Pagination::default(),
            )
            .await
            .unwrap();
        assert_eq!(ids(&replies), vec![id(9)]);
        assert_eq!(db.count_comments(&top("a.com/post")).await.unwrap(), 2);
    }
}
