//! Post entity for SeaORM.

use sea_orm::entity::prelude::*;

use forum_core::domain::Post;
use forum_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub original_content: Option<String>,
    pub image_path: Option<String>,
    pub moderation_status: String,
    pub created_at: DateTimeWithTimeZone,
    pub modified_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl TryFrom<Model> for Post {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let moderation_status = model
            .moderation_status
            .parse()
            .map_err(|e| super::corrupt_row("posts", e))?;
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            content: model.content,
            original_content: model.original_content,
            image_path: model.image_path,
            moderation_status,
            created_at: model.created_at.into(),
            modified_at: model.modified_at.map(Into::into),
        })
    }
}
