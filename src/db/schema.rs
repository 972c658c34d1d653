//! Schema bootstrap derived from the entity definitions.
//!
//! Tables come straight from the entities, so the unique `tags.number` column
//! and the cascading foreign keys on `company_tags` follow from the
//! `#[sea_orm(...)]` attributes. The composite `(company_id, tag_id)` unique
//! index cannot be expressed on the entity and is created here explicitly.

use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, DbErr, Schema};
use tracing::info;

use crate::db::entities::prelude::{Company, CompanyTag, CompanyTagColumn, Tag};

pub const UNIQUE_COMPANY_TAG_INDEX: &str = "unique_company_tag";

/// Creates every table and index the service needs. Safe to call on every
/// start-up.
pub async fn create_tables<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    // Parents first so the foreign keys on company_tags resolve.
    for mut stmt in [
        schema.create_table_from_entity(Company),
        schema.create_table_from_entity(Tag),
        schema.create_table_from_entity(CompanyTag),
    ] {
        stmt.if_not_exists();
        db.execute(backend.build(&stmt)).await?;
    }

    let unique_pair = Index::create()
        .name(UNIQUE_COMPANY_TAG_INDEX)
        .table(CompanyTag)
        .col(CompanyTagColumn::CompanyId)
        .col(CompanyTagColumn::TagId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&unique_pair)).await?;

    info!(backend = ?backend, "Database schema is up to date.");
    Ok(())
}
