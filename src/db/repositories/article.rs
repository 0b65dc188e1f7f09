use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::{article_categories, articles, categories, comments, prelude::*, users};

use super::category::CategoryRow;
use super::comment::CommentRow;
use super::user::User;

#[derive(Debug, Clone)]
pub struct ArticleRow {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub is_markdown: bool,
    pub user_id: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<articles::Model> for ArticleRow {
    fn from(model: articles::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            is_markdown: model.is_markdown,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// List row: owner and categories eager-loaded, comments left out.
#[derive(Debug, Clone)]
pub struct ArticleSummary {
    pub article: ArticleRow,
    pub user: Option<User>,
    pub categories: Vec<CategoryRow>,
}

/// Full read: owner, categories and comments.
#[derive(Debug, Clone)]
pub struct ArticleWithRelations {
    pub article: ArticleRow,
    pub user: Option<User>,
    pub categories: Vec<CategoryRow>,
    pub comments: Vec<CommentRow>,
}

#[derive(Debug)]
pub struct ArticlePage {
    pub articles: Vec<ArticleSummary>,
    pub total: u64,
}

#[derive(Debug)]
pub struct ArticleInput<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub is_markdown: bool,
    pub user_id: i32,
    pub category_ids: &'a [i32],
}

pub struct ArticleRepository {
    conn: DatabaseConnection,
}

impl ArticleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, input: ArticleInput<'_>) -> Result<ArticleWithRelations> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = articles::ActiveModel {
            title: Set(input.title.to_string()),
            content: Set(input.content.to_string()),
            is_markdown: Set(input.is_markdown),
            user_id: Set(input.user_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert article")?;

        self.replace_categories(model.id, input.category_ids)
            .await?;

        self.get(model.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Article {} vanished after insert", model.id))
    }

    pub async fn update(
        &self,
        id: i32,
        input: ArticleInput<'_>,
    ) -> Result<Option<ArticleWithRelations>> {
        let Some(model) = Articles::find_by_id(id)
            .filter(articles::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query article for update")?
        else {
            return Ok(None);
        };

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: articles::ActiveModel = model.into();
        active.title = Set(input.title.to_string());
        active.content = Set(input.content.to_string());
        active.is_markdown = Set(input.is_markdown);
        active.user_id = Set(input.user_id);
        active.updated_at = Set(now);
        active.update(&self.conn).await?;

        self.replace_categories(id, input.category_ids).await?;

        self.get(id).await
    }

    pub async fn get(&self, id: i32) -> Result<Option<ArticleWithRelations>> {
        let Some(model) = Articles::find_by_id(id)
            .filter(articles::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query article")?
        else {
            return Ok(None);
        };

        let user = Users::find_by_id(model.user_id)
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await?
            .map(User::from);

        let category_rows = model
            .find_related(Categories)
            .filter(categories::Column::DeletedAt.is_null())
            .order_by_asc(categories::Column::Id)
            .all(&self.conn)
            .await?;

        let comment_rows = Comments::find()
            .filter(comments::Column::ArticleId.eq(id))
            .filter(comments::Column::DeletedAt.is_null())
            .order_by_desc(comments::Column::CreatedAt)
            .order_by_desc(comments::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(Some(ArticleWithRelations {
            article: ArticleRow::from(model),
            user,
            categories: category_rows.into_iter().map(CategoryRow::from).collect(),
            comments: comment_rows.into_iter().map(CommentRow::from).collect(),
        }))
    }

    /// Paginated listing, newest first. `total` counts every undeleted
    /// article, not just the returned page.
    pub async fn list(&self, page: u64, page_size: u64) -> Result<ArticlePage> {
        let base = Articles::find()
            .filter(articles::Column::DeletedAt.is_null())
            .order_by_desc(articles::Column::CreatedAt)
            .order_by_desc(articles::Column::Id);

        let total = base.clone().count(&self.conn).await?;

        let rows = base
            .offset(page.saturating_sub(1) * page_size)
            .limit(page_size)
            .all(&self.conn)
            .await?;

        let owners = rows.load_one(Users, &self.conn).await?;

        let category_lists = rows
            .load_many_to_many(
                Categories::find().filter(categories::Column::DeletedAt.is_null()),
                ArticleCategories,
                &self.conn,
            )
            .await?;

        let articles = rows
            .into_iter()
            .zip(owners)
            .zip(category_lists)
            .map(|((model, owner), cats)| ArticleSummary {
                article: ArticleRow::from(model),
                user: owner.map(User::from),
                categories: cats.into_iter().map(CategoryRow::from).collect(),
            })
            .collect();

        Ok(ArticlePage { articles, total })
    }

    pub async fn soft_delete(&self, id: i32) -> Result<bool> {
        let result = Articles::update_many()
            .col_expr(
                articles::Column::DeletedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(articles::Column::Id.eq(id))
            .filter(articles::Column::DeletedAt.is_null())
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Drops the join rows for the article and writes the new set.
    async fn replace_categories(&self, article_id: i32, category_ids: &[i32]) -> Result<()> {
        ArticleCategories::delete_many()
            .filter(article_categories::Column::ArticleId.eq(article_id))
            .exec(&self.conn)
            .await?;

        if category_ids.is_empty() {
            return Ok(());
        }

        let links = category_ids.iter().map(|&category_id| {
            article_categories::ActiveModel {
                article_id: Set(article_id),
                category_id: Set(category_id),
            }
        });

        ArticleCategories::insert_many(links)
            .exec(&self.conn)
            .await
            .context("Failed to link article categories")?;

        Ok(())
    }
}
