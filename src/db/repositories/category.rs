use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{categories, prelude::*};

#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub id: i32,
    pub name: String,
    pub created_at: String,
}

impl From<categories::Model> for CategoryRow {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            created_at: model.created_at,
        }
    }
}

pub struct CategoryRepository {
    conn: DatabaseConnection,
}

impl CategoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, name: &str) -> Result<CategoryRow> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = categories::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert category")?;

        Ok(CategoryRow::from(model))
    }

    pub async fn list(&self) -> Result<Vec<CategoryRow>> {
        let rows = Categories::find()
            .filter(categories::Column::DeletedAt.is_null())
            .order_by_asc(categories::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(CategoryRow::from).collect())
    }

    /// The unique index spans soft-deleted rows too, so the check does not
    /// filter on `deleted_at`.
    pub async fn name_exists(&self, name: &str) -> Result<bool> {
        let count = Categories::find()
            .filter(categories::Column::Name.eq(name))
            .count(&self.conn)
            .await?;

        Ok(count > 0)
    }

    pub async fn soft_delete(&self, id: i32) -> Result<bool> {
        let result = Categories::update_many()
            .col_expr(
                categories::Column::DeletedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(categories::Column::Id.eq(id))
            .filter(categories::Column::DeletedAt.is_null())
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
