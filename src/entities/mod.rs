pub mod prelude;

pub mod article_categories;
pub mod articles;
pub mod auth_tokens;
pub mod categories;
pub mod comments;
pub mod users;
