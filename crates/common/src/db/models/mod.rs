//! SeaORM entity models
//!
//! Database entities for Minipress

mod article;
mod contact_request;
mod user;

pub use article::{
    Entity as ArticleEntity,
    Model as Article,
    ActiveModel as ArticleActiveModel,
    Column as ArticleColumn,
};

pub use contact_request::{
    Entity as ContactRequestEntity,
    Model as ContactRequest,
    ActiveModel as ContactRequestActiveModel,
    Column as ContactRequestColumn,
};

pub use user::{
    Entity as UserEntity,
    Model as User,
    ActiveModel as UserActiveModel,
    Column as UserColumn,
};
