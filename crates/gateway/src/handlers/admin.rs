//! Administrative handlers
//!
//! Every operation consults the capability table before touching the store.
//! Contact requests are view and delete only; the add and edit routes exist
//! and always answer with a permission error.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::handlers::articles::ArticleResponse;
use crate::AppState;
use minipress_common::{
    admin::{require, AdminAction, AdminEntity},
    db::{
        models::ContactRequest, ArticleFilter, ContactRequestFilter, NewArticle, Repository,
        UpdateArticle,
    },
    errors::{AppError, Result},
    validation::collect_field_errors,
};

fn default_true() -> bool {
    true
}

fn default_limit() -> u64 {
    50
}

/// Request to create an article
#[derive(Debug, Deserialize, Validate)]
pub struct CreateArticleRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    /// Explicit slug; derived from the title when absent
    pub slug: Option<String>,

    #[serde(default)]
    pub content: String,

    pub author_id: i64,

    #[serde(default = "default_true")]
    pub is_online: bool,
}

/// Request to update an article; slug and publication datetime are immutable
#[derive(Debug, Default, Deserialize)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_online: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ArticleListParams {
    /// Title substring filter
    pub title: Option<String>,
    /// Author username filter
    pub author: Option<String>,
    /// Online-status filter
    pub online: Option<bool>,
    #[serde(default)]
    pub offset: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

#[derive(Debug, Deserialize)]
pub struct ContactRequestListParams {
    /// Exact email filter
    pub email: Option<String>,
    /// Name substring filter
    pub name: Option<String>,
    /// Lower bound on submission date
    pub since: Option<DateTime<Utc>>,
    /// Upper bound on submission date
    pub until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub offset: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

#[derive(Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

#[derive(Serialize)]
pub struct ContactRequestResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub content: String,
    pub date: String,
}

impl From<ContactRequest> for ContactRequestResponse {
    fn from(request: ContactRequest) -> Self {
        Self {
            id: request.id,
            email: request.email,
            name: request.name,
            content: request.content,
            date: request.date.to_rfc3339(),
        }
    }
}

// ============================================================================
// Articles
// ============================================================================

/// List articles with optional title/author/online filters
pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<ArticleListParams>,
) -> Result<Json<ListResponse<ArticleResponse>>> {
    require(AdminEntity::Articles, AdminAction::View)?;

    let repo = Repository::new(state.db.clone());

    let filter = ArticleFilter {
        title_contains: params.title,
        author_username: params.author,
        is_online: params.online,
    };

    let (articles, total) = repo.list_articles(filter, params.offset, params.limit).await?;

    Ok(Json(ListResponse {
        items: articles.into_iter().map(Into::into).collect(),
        total,
        offset: params.offset,
        limit: params.limit,
    }))
}

/// Create an article
pub async fn create_article(
    State(state): State<AppState>,
    Json(request): Json<CreateArticleRequest>,
) -> Result<(StatusCode, Json<ArticleResponse>)> {
    require(AdminEntity::Articles, AdminAction::Add)?;

    request.validate().map_err(|e| AppError::FieldValidation {
        errors: collect_field_errors(&e),
    })?;

    let repo = Repository::new(state.db.clone());

    let article = repo
        .create_article(NewArticle {
            title: request.title,
            slug: request.slug,
            content: request.content,
            author_id: request.author_id,
            is_online: request.is_online,
        })
        .await?;

    tracing::info!(article_id = article.id, slug = %article.slug, "Article created");

    Ok((StatusCode::CREATED, Json(article.into())))
}

/// Get an article by id, regardless of visibility
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ArticleResponse>> {
    require(AdminEntity::Articles, AdminAction::View)?;

    let repo = Repository::new(state.db.clone());

    let article = repo
        .find_article_by_id(id)
        .await?
        .ok_or_else(|| AppError::ArticleNotFound { id: id.to_string() })?;

    Ok(Json(article.into()))
}

/// Update an article's mutable fields
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateArticleRequest>,
) -> Result<Json<ArticleResponse>> {
    require(AdminEntity::Articles, AdminAction::Edit)?;

    let repo = Repository::new(state.db.clone());

    let article = repo
        .update_article(
            id,
            UpdateArticle {
                title: request.title,
                content: request.content,
                is_online: request.is_online,
            },
        )
        .await?;

    tracing::info!(article_id = article.id, "Article updated");

    Ok(Json(article.into()))
}

/// Delete an article
pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    require(AdminEntity::Articles, AdminAction::Delete)?;

    let repo = Repository::new(state.db.clone());

    if !repo.delete_article(id).await? {
        return Err(AppError::ArticleNotFound { id: id.to_string() });
    }

    tracing::info!(article_id = id, "Article deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Contact Requests
// ============================================================================

/// List contact requests with optional email/name/date filters
pub async fn list_contact_requests(
    State(state): State<AppState>,
    Query(params): Query<ContactRequestListParams>,
) -> Result<Json<ListResponse<ContactRequestResponse>>> {
    require(AdminEntity::ContactRequests, AdminAction::View)?;

    let repo = Repository::new(state.db.clone());

    let filter = ContactRequestFilter {
        email: params.email,
        name_contains: params.name,
        since: params.since,
        until: params.until,
    };

    let (requests, total) = repo
        .list_contact_requests(filter, params.offset, params.limit)
        .await?;

    Ok(Json(ListResponse {
        items: requests.into_iter().map(Into::into).collect(),
        total,
        offset: params.offset,
        limit: params.limit,
    }))
}

/// Get a contact request by id
pub async fn get_contact_request(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ContactRequestResponse>> {
    require(AdminEntity::ContactRequests, AdminAction::View)?;

    let repo = Repository::new(state.db.clone());

    let request = repo
        .find_contact_request_by_id(id)
        .await?
        .ok_or_else(|| AppError::ContactRequestNotFound { id: id.to_string() })?;

    Ok(Json(request.into()))
}

/// Creating contact requests through the admin surface is always rejected;
/// they only come in through the public intake path.
pub async fn create_contact_request() -> Result<StatusCode> {
    require(AdminEntity::ContactRequests, AdminAction::Add)?;
    unreachable!("capability table forbids adding contact requests")
}

/// Editing contact requests is always rejected; entries are read-only.
pub async fn update_contact_request(Path(_id): Path<i64>) -> Result<StatusCode> {
    require(AdminEntity::ContactRequests, AdminAction::Edit)?;
    unreachable!("capability table forbids editing contact requests")
}

/// Delete a contact request
pub async fn delete_contact_request(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    require(AdminEntity::ContactRequests, AdminAction::Delete)?;

    let repo = Repository::new(state.db.clone());

    if !repo.delete_contact_request(id).await? {
        return Err(AppError::ContactRequestNotFound { id: id.to_string() });
    }

    tracing::info!(contact_request_id = id, "Contact request deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_admin_create_contact_request_is_forbidden() {
        let err = create_contact_request().await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_update_contact_request_is_forbidden() {
        let err = update_contact_request(Path(1)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_create_article_request_title_bounds() {
        let request = CreateArticleRequest {
            title: String::new(),
            slug: None,
            content: String::new(),
            author_id: 1,
            is_online: true,
        };
        assert!(request.validate().is_err());

        let request = CreateArticleRequest {
            title: "Test Article".to_string(),
            slug: None,
            content: "Body".to_string(),
            author_id: 1,
            is_online: true,
        };
        assert!(request.validate().is_ok());
    }
}
