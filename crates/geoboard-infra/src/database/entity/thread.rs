//! Thread entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "threads")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub board_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_at: DateTimeWithTimeZone,
    pub expires_at: Option<DateTimeWithTimeZone>,
    pub is_archived: bool,
    pub restored_at: Option<DateTimeWithTimeZone>,
    pub restore_count: i32,
    pub post_count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::board::Entity",
        from = "Column::BoardId",
        to = "super::board::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Board,
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
}

impl Related<super::board::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Board.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Thread.
impl From<Model> for geoboard_core::domain::Thread {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            board_id: model.board_id,
            author_id: model.author_id,
            title: model.title,
            content: model.content,
            created_at: model.created_at.into(),
            expires_at: model.expires_at.map(Into::into),
            is_archived: model.is_archived,
            restored_at: model.restored_at.map(Into::into),
            restore_count: model.restore_count,
            post_count: model.post_count,
        }
    }
}

/// Conversion from Domain Thread to SeaORM ActiveModel.
impl From<geoboard_core::domain::Thread> for ActiveModel {
    fn from(thread: geoboard_core::domain::Thread) -> Self {
        Self {
            id: Set(thread.id),
            board_id: Set(thread.board_id),
            author_id: Set(thread.author_id),
            title: Set(thread.title),
            content: Set(thread.content),
            created_at: Set(thread.created_at.into()),
            expires_at: Set(thread.expires_at.map(Into::into)),
            is_archived: Set(thread.is_archived),
            restored_at: Set(thread.restored_at.map(Into::into)),
            restore_count: Set(thread.restore_count),
            post_count: Set(thread.post_count),
        }
    }
}
