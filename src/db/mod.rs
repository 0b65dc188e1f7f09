use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::article::{
    ArticleInput, ArticlePage, ArticleRow, ArticleSummary, ArticleWithRelations,
};
pub use repositories::category::CategoryRow;
pub use repositories::comment::{CommentInput, CommentRow};
pub use repositories::user::{NewUser, User};

/// Database facade. Cheap to clone; repositories share the pooled connection.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn article_repo(&self) -> repositories::article::ArticleRepository {
        repositories::article::ArticleRepository::new(self.conn.clone())
    }

    fn category_repo(&self) -> repositories::category::CategoryRepository {
        repositories::category::CategoryRepository::new(self.conn.clone())
    }

    fn comment_repo(&self) -> repositories::comment::CommentRepository {
        repositories::comment::CommentRepository::new(self.conn.clone())
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn create_user(&self, user: NewUser<'_>) -> Result<User> {
        self.user_repo().create(user).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn update_user_password(&self, username: &str, new_password: &str) -> Result<()> {
        self.user_repo()
            .update_password(username, new_password)
            .await
    }

    // ------------------------------------------------------------------
    // Articles
    // ------------------------------------------------------------------

    pub async fn create_article(&self, input: ArticleInput<'_>) -> Result<ArticleWithRelations> {
        self.article_repo().create(input).await
    }

    pub async fn update_article(
        &self,
        id: i32,
        input: ArticleInput<'_>,
    ) -> Result<Option<ArticleWithRelations>> {
        self.article_repo().update(id, input).await
    }

    pub async fn get_article(&self, id: i32) -> Result<Option<ArticleWithRelations>> {
        self.article_repo().get(id).await
    }

    pub async fn list_articles(&self, page: u64, page_size: u64) -> Result<ArticlePage> {
        self.article_repo().list(page, page_size).await
    }

    pub async fn delete_article(&self, id: i32) -> Result<bool> {
        self.article_repo().soft_delete(id).await
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    pub async fn create_category(&self, name: &str) -> Result<CategoryRow> {
        self.category_repo().create(name).await
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryRow>> {
        self.category_repo().list().await
    }

    pub async fn category_name_exists(&self, name: &str) -> Result<bool> {
        self.category_repo().name_exists(name).await
    }

    pub async fn delete_category(&self, id: i32) -> Result<bool> {
        self.category_repo().soft_delete(id).await
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    pub async fn create_comment(&self, input: CommentInput<'_>) -> Result<CommentRow> {
        self.comment_repo().create(input).await
    }

    pub async fn list_comments_for_article(&self, article_id: i32) -> Result<Vec<CommentRow>> {
        self.comment_repo().list_for_article(article_id).await
    }

    pub async fn delete_comment(&self, id: i32) -> Result<bool> {
        self.comment_repo().soft_delete(id).await
    }
}
