//! Notification entity for SeaORM.

use sea_orm::entity::prelude::*;

use forum_core::domain::Notification;
use forum_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub post_id: Option<i64>,
    pub comment_id: Option<i64>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Notification {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            message: model.message,
            post_id: model.post_id,
            comment_id: model.comment_id,
            created_at: model.created_at.into(),
        })
    }
}
