//! Public article browsing handlers
//!
//! Every read path goes through the repository's visibility filter, so an
//! offline article answers exactly like a nonexistent one.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use minipress_common::{
    db::{models::Article, Repository},
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// 1-indexed page number
    pub page: Option<u64>,
}

/// Public representation of an article
#[derive(Serialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub author_id: i64,
    pub publication_datetime: String,
    pub is_online: bool,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            slug: article.slug,
            content: article.content,
            author_id: article.author_id,
            publication_datetime: article.publication_datetime.to_rfc3339(),
            is_online: article.is_online,
        }
    }
}

#[derive(Serialize)]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleResponse>,
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

/// List online articles, five per page
pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ArticleListResponse>> {
    let repo = Repository::new(state.db.clone());

    // Pages are 1-indexed on the wire
    let page = params.page.unwrap_or(1).max(1) - 1;
    let listing = repo.list_online_articles(page).await?;

    Ok(Json(ArticleListResponse {
        articles: listing.articles.into_iter().map(Into::into).collect(),
        page: listing.page + 1,
        page_size: listing.page_size,
        total_items: listing.total_items,
        total_pages: listing.total_pages,
    }))
}

/// Get a single online article addressed as `{slug}-{id}`
pub async fn get_article(
    State(state): State<AppState>,
    Path(slug_id): Path<String>,
) -> Result<Json<ArticleResponse>> {
    let (slug, id) = parse_slug_id(&slug_id)
        .ok_or_else(|| AppError::ArticleNotFound { id: slug_id.clone() })?;

    let repo = Repository::new(state.db.clone());

    let article = repo
        .find_online_article(slug, id)
        .await?
        .ok_or_else(|| AppError::ArticleNotFound { id: slug_id.clone() })?;

    Ok(Json(article.into()))
}

/// Split a `{slug}-{id}` path segment on its last hyphen
fn parse_slug_id(segment: &str) -> Option<(&str, i64)> {
    let (slug, id) = segment.rsplit_once('-')?;
    if slug.is_empty() {
        return None;
    }
    let id: i64 = id.parse().ok()?;
    Some((slug, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slug_id() {
        assert_eq!(parse_slug_id("test-article-7"), Some(("test-article", 7)));
        assert_eq!(parse_slug_id("a-1"), Some(("a", 1)));
    }

    #[test]
    fn test_parse_slug_id_rejects_malformed() {
        assert_eq!(parse_slug_id("no-trailing-id-"), None);
        assert_eq!(parse_slug_id("noid"), None);
        assert_eq!(parse_slug_id("-7"), None);
        assert_eq!(parse_slug_id("slug-notanumber"), None);
    }
}
