use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: Option<String>,
    // External key, addressed as `tag_<number>`
    #[sea_orm(unique)]
    pub number: i32,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::company_tag::Entity")]
    CompanyTag,
}

impl Related<super::company_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CompanyTag.def()
    }
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        super::company_tag::Relation::Company.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::company_tag::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
