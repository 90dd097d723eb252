use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub writer_id: i32,
    pub reviewed_movie_id: i32,
    pub review_title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub rating: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::WriterId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Writer,
    #[sea_orm(
        belongs_to = "super::movie::Entity",
        from = "Column::ReviewedMovieId",
        to = "super::movie::Column::Id",
        on_delete = "Cascade"
    )]
    ReviewedMovie,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Writer.def()
    }
}

impl Related<super::movie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReviewedMovie.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
