use serde::Serialize;

use crate::db::{ArticleSummary, ArticleWithRelations, CategoryRow, CommentRow, User};

/// Error envelope: `{"error": "..."}`. Success responses serialize their
/// payload directly.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryDto {
    pub id: i32,
    pub name: String,
    pub created_at: String,
}

impl From<CategoryRow> for CategoryDto {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentDto {
    pub id: i32,
    pub content: String,
    pub article_id: i32,
    pub user_id: Option<i32>,
    pub user_name: String,
    pub created_at: String,
}

impl From<CommentRow> for CommentDto {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            article_id: row.article_id,
            user_id: row.user_id,
            user_name: row.user_name,
            created_at: row.created_at,
        }
    }
}

/// Article as it appears in the paginated listing: owner and categories,
/// no comments.
#[derive(Debug, Serialize)]
pub struct ArticleSummaryDto {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub is_markdown: bool,
    pub user: Option<UserDto>,
    pub categories: Vec<CategoryDto>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ArticleSummary> for ArticleSummaryDto {
    fn from(summary: ArticleSummary) -> Self {
        Self {
            id: summary.article.id,
            title: summary.article.title,
            content: summary.article.content,
            is_markdown: summary.article.is_markdown,
            user: summary.user.map(UserDto::from),
            categories: summary.categories.into_iter().map(CategoryDto::from).collect(),
            created_at: summary.article.created_at,
            updated_at: summary.article.updated_at,
        }
    }
}

/// Full article read with nested user, categories and comments.
#[derive(Debug, Serialize)]
pub struct ArticleDto {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub is_markdown: bool,
    pub user: Option<UserDto>,
    pub categories: Vec<CategoryDto>,
    pub comments: Vec<CommentDto>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ArticleWithRelations> for ArticleDto {
    fn from(full: ArticleWithRelations) -> Self {
        Self {
            id: full.article.id,
            title: full.article.title,
            content: full.article.content,
            is_markdown: full.article.is_markdown,
            user: full.user.map(UserDto::from),
            categories: full.categories.into_iter().map(CategoryDto::from).collect(),
            comments: full.comments.into_iter().map(CommentDto::from).collect(),
            created_at: full.article.created_at,
            updated_at: full.article.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleListResponse {
    pub data: Vec<ArticleSummaryDto>,
    pub total: u64,
    pub page: u64,
    #[serde(rename = "pageSize")]
    pub page_size: u64,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
}
