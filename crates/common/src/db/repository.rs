//! Repository pattern for database operations
//!
//! All public article reads go through the visibility predicate here:
//! only `is_online = true` rows are reachable from the public paths, so an
//! offline article is indistinguishable from a nonexistent one.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::slug::{is_slug, slugify};
use crate::validation::ValidContact;
use crate::ARTICLE_PAGE_SIZE;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};

/// Upper bound on article titles, enforced on both create and update
pub const TITLE_MAX_LEN: usize = 255;

/// Input for creating an article
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    /// Explicit slug; derived from the title when absent
    pub slug: Option<String>,
    pub content: String,
    pub author_id: i64,
    pub is_online: bool,
}

/// Mutable article fields; slug and publication datetime are immutable
#[derive(Debug, Clone, Default)]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_online: Option<bool>,
}

/// Admin-side article listing filters
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub title_contains: Option<String>,
    pub author_username: Option<String>,
    pub is_online: Option<bool>,
}

/// Admin-side contact request listing filters
#[derive(Debug, Clone, Default)]
pub struct ContactRequestFilter {
    pub email: Option<String>,
    pub name_contains: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

/// One page of the public article list
#[derive(Debug, Clone)]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Public Article Reads (visibility-filtered)
    // ========================================================================

    /// List online articles in insertion order, one fixed-size page at a time.
    /// Pages are zero-indexed.
    pub async fn list_online_articles(&self, page: u64) -> Result<ArticlePage> {
        let paginator = ArticleEntity::find()
            .filter(ArticleColumn::IsOnline.eq(true))
            .order_by_asc(ArticleColumn::Id)
            .paginate(self.read_conn(), ARTICLE_PAGE_SIZE);

        let totals = paginator.num_items_and_pages().await?;
        let articles = paginator.fetch_page(page).await?;

        Ok(ArticlePage {
            articles,
            page,
            page_size: ARTICLE_PAGE_SIZE,
            total_items: totals.number_of_items,
            total_pages: totals.number_of_pages,
        })
    }

    /// Find a single online article by slug and id. Offline or absent
    /// articles both come back as `None`.
    pub async fn find_online_article(&self, slug: &str, id: i64) -> Result<Option<Article>> {
        ArticleEntity::find()
            .filter(ArticleColumn::Id.eq(id))
            .filter(ArticleColumn::Slug.eq(slug))
            .filter(ArticleColumn::IsOnline.eq(true))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Article Administration
    // ========================================================================

    /// Create a new article. The slug is derived from the title when not
    /// supplied and must be unique; the publication datetime is server-set.
    pub async fn create_article(&self, input: NewArticle) -> Result<Article> {
        if input.title.trim().is_empty() {
            return Err(AppError::Validation {
                message: "title must not be empty".to_string(),
                field: Some("title".to_string()),
            });
        }

        if input.title.chars().count() > TITLE_MAX_LEN {
            return Err(AppError::Validation {
                message: format!("title must be at most {} characters", TITLE_MAX_LEN),
                field: Some("title".to_string()),
            });
        }

        let slug = match input.slug {
            Some(slug) => {
                if !is_slug(&slug) {
                    return Err(AppError::InvalidFormat {
                        message: format!("'{}' is not a valid slug", slug),
                    });
                }
                slug
            }
            None => {
                let derived = slugify(&input.title);
                if derived.is_empty() {
                    return Err(AppError::Validation {
                        message: "title does not yield a usable slug".to_string(),
                        field: Some("title".to_string()),
                    });
                }
                derived
            }
        };

        let existing = ArticleEntity::find()
            .filter(ArticleColumn::Slug.eq(&slug))
            .one(self.write_conn())
            .await?;
        if existing.is_some() {
            return Err(AppError::DuplicateSlug { slug });
        }

        let author = UserEntity::find_by_id(input.author_id)
            .one(self.write_conn())
            .await?;
        if author.is_none() {
            return Err(AppError::AuthorNotFound {
                id: input.author_id.to_string(),
            });
        }

        let now = chrono::Utc::now();

        let article = ArticleActiveModel {
            id: NotSet,
            title: Set(input.title),
            slug: Set(slug.clone()),
            content: Set(input.content),
            author_id: Set(input.author_id),
            publication_datetime: Set(now.into()),
            is_online: Set(input.is_online),
        };

        // The existence check above races with concurrent inserts; the
        // unique index is the arbiter, so its violation is still a conflict.
        article
            .insert(self.write_conn())
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateSlug { slug },
                _ => e.into(),
            })
    }

    /// Find an article by id, regardless of visibility (admin read)
    pub async fn find_article_by_id(&self, id: i64) -> Result<Option<Article>> {
        ArticleEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Update mutable article fields; slug and publication datetime stay as-is
    pub async fn update_article(&self, id: i64, changes: UpdateArticle) -> Result<Article> {
        let mut article: ArticleActiveModel = ArticleEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::ArticleNotFound { id: id.to_string() })?
            .into();

        if let Some(title) = changes.title {
            if title.trim().is_empty() {
                return Err(AppError::Validation {
                    message: "title must not be empty".to_string(),
                    field: Some("title".to_string()),
                });
            }
            if title.chars().count() > TITLE_MAX_LEN {
                return Err(AppError::Validation {
                    message: format!("title must be at most {} characters", TITLE_MAX_LEN),
                    field: Some("title".to_string()),
                });
            }
            article.title = Set(title);
        }

        if let Some(content) = changes.content {
            article.content = Set(content);
        }

        if let Some(is_online) = changes.is_online {
            article.is_online = Set(is_online);
        }

        article.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete an article by id
    pub async fn delete_article(&self, id: i64) -> Result<bool> {
        let result = ArticleEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// List articles for the admin surface with optional filters
    pub async fn list_articles(
        &self,
        filter: ArticleFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Article>, u64)> {
        let mut query = ArticleEntity::find();

        if let Some(ref title) = filter.title_contains {
            query = query.filter(ArticleColumn::Title.contains(title));
        }

        if let Some(is_online) = filter.is_online {
            query = query.filter(ArticleColumn::IsOnline.eq(is_online));
        }

        if let Some(ref username) = filter.author_username {
            let author = UserEntity::find()
                .filter(UserColumn::Username.eq(username))
                .one(self.read_conn())
                .await?;
            match author {
                Some(author) => query = query.filter(ArticleColumn::AuthorId.eq(author.id)),
                None => return Ok((Vec::new(), 0)),
            }
        }

        let total = query.clone().count(self.read_conn()).await?;

        let articles = query
            .order_by_asc(ArticleColumn::Id)
            .offset(offset)
            .limit(limit)
            .all(self.read_conn())
            .await?;

        Ok((articles, total))
    }

    // ========================================================================
    // Contact Requests
    // ========================================================================

    /// Persist a validated contact submission with a server-assigned date
    pub async fn create_contact_request(&self, contact: &ValidContact) -> Result<ContactRequest> {
        let now = chrono::Utc::now();

        let request = ContactRequestActiveModel {
            id: NotSet,
            email: Set(contact.email.clone()),
            name: Set(contact.name.clone()),
            content: Set(contact.content.clone()),
            date: Set(now.into()),
        };

        request.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find a contact request by id (admin read)
    pub async fn find_contact_request_by_id(&self, id: i64) -> Result<Option<ContactRequest>> {
        ContactRequestEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List contact requests for the admin surface with optional filters
    pub async fn list_contact_requests(
        &self,
        filter: ContactRequestFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<ContactRequest>, u64)> {
        let mut query = ContactRequestEntity::find();

        if let Some(ref email) = filter.email {
            query = query.filter(ContactRequestColumn::Email.eq(email));
        }

        if let Some(ref name) = filter.name_contains {
            query = query.filter(ContactRequestColumn::Name.contains(name));
        }

        if let Some(since) = filter.since {
            query = query.filter(ContactRequestColumn::Date.gte(since));
        }

        if let Some(until) = filter.until {
            query = query.filter(ContactRequestColumn::Date.lte(until));
        }

        let total = query.clone().count(self.read_conn()).await?;

        let requests = query
            .order_by_desc(ContactRequestColumn::Date)
            .offset(offset)
            .limit(limit)
            .all(self.read_conn())
            .await?;

        Ok((requests, total))
    }

    /// Delete a contact request by id
    pub async fn delete_contact_request(&self, id: i64) -> Result<bool> {
        let result = ContactRequestEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    /// sea-orm's `mock` feature removes `Clone` from `DatabaseConnection`;
    /// this restores a `clone` method so tests can keep a second handle to
    /// the (`Arc`-backed) mock connection for reading the transaction log.
    trait CloneConnection {
        fn clone(&self) -> DatabaseConnection;
    }

    impl CloneConnection for DatabaseConnection {
        fn clone(&self) -> DatabaseConnection {
            match self {
                DatabaseConnection::SqlxPostgresPoolConnection(c) => {
                    DatabaseConnection::SqlxPostgresPoolConnection(c.clone())
                }
                DatabaseConnection::MockDatabaseConnection(c) => {
                    DatabaseConnection::MockDatabaseConnection(std::sync::Arc::clone(c))
                }
                DatabaseConnection::Disconnected => DatabaseConnection::Disconnected,
            }
        }
    }

    fn repo(conn: DatabaseConnection) -> Repository {
        Repository::new(DbPool {
            primary: conn,
            replica: None,
        })
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    fn article(id: i64, slug: &str, is_online: bool) -> Article {
        Article {
            id,
            title: format!("Article {}", id),
            slug: slug.to_string(),
            content: "Body".to_string(),
            author_id: 1,
            publication_datetime: chrono::Utc::now().into(),
            is_online,
        }
    }

    #[tokio::test]
    async fn test_public_list_queries_only_online_articles() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![article(1, "first-post", true)]])
            .into_connection();
        let conn = db.clone();

        let page = repo(db).list_online_articles(0).await.unwrap();

        assert_eq!(page.total_items, 1);
        assert_eq!(page.page_size, ARTICLE_PAGE_SIZE);
        assert!(page.articles.iter().all(|a| a.is_online));

        // Both the count and the fetch carry the visibility predicate
        let log = format!("{:?}", conn.into_transaction_log());
        assert!(log.contains("is_online"));
    }

    #[tokio::test]
    async fn test_offline_detail_indistinguishable_from_absent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Article>::new()])
            .into_connection();
        let conn = db.clone();

        let found = repo(db).find_online_article("hidden-draft", 9).await.unwrap();
        assert!(found.is_none());

        let log = format!("{:?}", conn.into_transaction_log());
        assert!(log.contains("is_online"));
    }

    #[tokio::test]
    async fn test_create_article_rejects_duplicate_slug() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![article(1, "taken", true)]])
            .into_connection();

        let err = repo(db)
            .create_article(NewArticle {
                title: "Taken".to_string(),
                slug: Some("taken".to_string()),
                content: String::new(),
                author_id: 1,
                is_online: true,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DuplicateSlug { .. }));
    }

    #[tokio::test]
    async fn test_create_article_rejects_overlong_title() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = repo(db)
            .create_article(NewArticle {
                title: "x".repeat(TITLE_MAX_LEN + 1),
                slug: Some("fits".to_string()),
                content: String::new(),
                author_id: 1,
                is_online: true,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_article_rejects_overlong_title() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![article(1, "first-post", true)]])
            .into_connection();

        let err = repo(db)
            .update_article(
                1,
                UpdateArticle {
                    title: Some("x".repeat(TITLE_MAX_LEN + 1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_contact_request_assigns_server_date() {
        let stored = ContactRequest {
            id: 1,
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            content: "Hello".to_string(),
            date: chrono::Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored]])
            .into_connection();
        let conn = db.clone();

        let created = repo(db)
            .create_contact_request(&ValidContact {
                email: "ada@example.com".to_string(),
                name: "Ada".to_string(),
                content: "Hello".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(created.id, 1);

        // The insert carries a date column even though the caller supplied none
        let log = format!("{:?}", conn.into_transaction_log());
        assert!(log.contains("date"));
        assert!(log.contains("ada@example.com"));
    }

    #[tokio::test]
    async fn test_admin_list_honors_row_offset() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(100)]])
            .append_query_results([vec![article(76, "row-76", true)]])
            .into_connection();
        let conn = db.clone();

        let (_, total) = repo(db)
            .list_articles(ArticleFilter::default(), 75, 50)
            .await
            .unwrap();
        assert_eq!(total, 100);

        let log = format!("{:?}", conn.into_transaction_log());
        assert!(log.contains("OFFSET"));
        assert!(log.contains("75"));
    }
}
