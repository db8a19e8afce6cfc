//! Vote rows. The table keeps its historical name `likes`; `value` is +1
//! or -1 and exactly one of `post_id` / `comment_id` is set.

use sea_orm::entity::prelude::*;

use forum_core::domain::{Vote, VoteTarget, VoteValue};
use forum_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "likes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub post_id: Option<i64>,
    pub comment_id: Option<i64>,
    pub value: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Vote {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let target = match (model.post_id, model.comment_id) {
            (Some(post_id), None) => VoteTarget::Post(post_id),
            (None, Some(comment_id)) => VoteTarget::Comment(comment_id),
            _ => return Err(super::corrupt_row("likes", "target")),
        };
        let value = VoteValue::try_from(model.value).map_err(|e| super::corrupt_row("likes", e))?;
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            target,
            value,
        })
    }
}
