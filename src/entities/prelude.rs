pub use super::article_categories::Entity as ArticleCategories;
pub use super::articles::Entity as Articles;
pub use super::auth_tokens::Entity as AuthTokens;
pub use super::categories::Entity as Categories;
pub use super::comments::Entity as Comments;
pub use super::users::Entity as Users;
