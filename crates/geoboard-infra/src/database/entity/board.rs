//! Board entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use geoboard_core::domain::BoardCategory;
use geoboard_core::geo::Coordinate;

/// Board category stored as a short string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Category {
    #[sea_orm(string_value = "station")]
    Station,
    #[sea_orm(string_value = "ward")]
    Ward,
    #[sea_orm(string_value = "park")]
    Park,
}

impl From<Category> for BoardCategory {
    fn from(category: Category) -> Self {
        match category {
            Category::Station => BoardCategory::Station,
            Category::Ward => BoardCategory::Ward,
            Category::Park => BoardCategory::Park,
        }
    }
}

impl From<BoardCategory> for Category {
    fn from(category: BoardCategory) -> Self {
        match category {
            BoardCategory::Station => Category::Station,
            BoardCategory::Ward => Category::Ward,
            BoardCategory::Park => Category::Park,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "boards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    pub latitude: f64,
    pub longitude: f64,
    pub access_radius_m: f64,
    pub view_radius_m: f64,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::thread::Entity")]
    Thread,
}

impl Related<super::thread::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Thread.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Board.
impl From<Model> for geoboard_core::domain::Board {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category: model.category.into(),
            location: Coordinate::new(model.latitude, model.longitude),
            access_radius_m: model.access_radius_m,
            view_radius_m: model.view_radius_m,
            description: model.description,
            created_at: model.created_at.into(),
        }
    }
}

/// Conversion from Domain Board to SeaORM ActiveModel.
impl From<geoboard_core::domain::Board> for ActiveModel {
    fn from(board: geoboard_core::domain::Board) -> Self {
        Self {
            id: Set(board.id),
            name: Set(board.name),
            category: Set(board.category.into()),
            latitude: Set(board.location.lat),
            longitude: Set(board.location.lng),
            access_radius_m: Set(board.access_radius_m),
            view_radius_m: Set(board.view_radius_m),
            description: Set(board.description),
            created_at: Set(board.created_at.into()),
        }
    }
}
