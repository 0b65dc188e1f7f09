use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{comments, prelude::*};

#[derive(Debug, Clone)]
pub struct CommentRow {
    pub id: i32,
    pub content: String,
    pub article_id: i32,
    pub user_id: Option<i32>,
    pub user_name: String,
    pub ip: String,
    pub created_at: String,
}

impl From<comments::Model> for CommentRow {
    fn from(model: comments::Model) -> Self {
        Self {
            id: model.id,
            content: model.content,
            article_id: model.article_id,
            user_id: model.user_id,
            user_name: model.user_name,
            ip: model.ip,
            created_at: model.created_at,
        }
    }
}

/// Comment creation input. There is intentionally no user reference here:
/// comments are anonymous, whatever the request claimed.
#[derive(Debug)]
pub struct CommentInput<'a> {
    pub article_id: i32,
    pub content: &'a str,
    pub user_name: Option<&'a str>,
    pub ip: &'a str,
}

pub struct CommentRepository {
    conn: DatabaseConnection,
}

impl CommentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, input: CommentInput<'_>) -> Result<CommentRow> {
        let now = chrono::Utc::now().to_rfc3339();

        let user_name = match input.user_name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => "Anonymous".to_string(),
        };

        let active = comments::ActiveModel {
            content: Set(input.content.to_string()),
            article_id: Set(input.article_id),
            user_id: Set(None),
            user_name: Set(user_name),
            ip: Set(input.ip.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert comment")?;

        Ok(CommentRow::from(model))
    }

    pub async fn list_for_article(&self, article_id: i32) -> Result<Vec<CommentRow>> {
        let rows = Comments::find()
            .filter(comments::Column::ArticleId.eq(article_id))
            .filter(comments::Column::DeletedAt.is_null())
            .order_by_desc(comments::Column::CreatedAt)
            .order_by_desc(comments::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(CommentRow::from).collect())
    }

    pub async fn soft_delete(&self, id: i32) -> Result<bool> {
        let result = Comments::update_many()
            .col_expr(
                comments::Column::DeletedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(comments::Column::Id.eq(id))
            .filter(comments::Column::DeletedAt.is_null())
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
