use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use tracing::{debug, info};

use super::ServiceError;
use crate::db::entities::{company, company_tag, tag};
use crate::db::models::{CompanyTagSchema, TagUpdateResponse};

// --- Tag Service Functions ---

/// Creates a new tag. Tag numbers are unique across the directory.
pub async fn create_tag(
    db: &DatabaseConnection,
    name: Option<&str>,
    number: i32,
) -> Result<tag::Model, ServiceError> {
    let now = Utc::now();
    let new_tag = tag::ActiveModel {
        name: Set(name.map(str::to_owned)),
        number: Set(number),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    new_tag.insert(db).await.map_err(|db_err| match db_err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::DuplicateTagNumber(number),
        _ => ServiceError::Database(db_err),
    })
}

/// Retrieves every tag attached to a company, ordered by tag id.
pub async fn get_tags_for_company<C: ConnectionTrait>(
    db: &C,
    company_id: i32,
) -> Result<Vec<tag::Model>, DbErr> {
    tag::Entity::find()
        .inner_join(company_tag::Entity)
        .filter(company_tag::Column::CompanyId.eq(company_id))
        .order_by_asc(tag::Column::Id)
        .all(db)
        .await
}

async fn find_company_and_tag<C: ConnectionTrait>(
    db: &C,
    company_id: i32,
    tag_id: i32,
) -> Result<(company::Model, tag::Model), ServiceError> {
    let company = company::Entity::find_by_id(company_id)
        .one(db)
        .await?
        .ok_or(ServiceError::CompanyNotFound)?;
    let tag = tag::Entity::find_by_id(tag_id)
        .one(db)
        .await?
        .ok_or(ServiceError::TagNotFound)?;
    Ok((company, tag))
}

async fn tag_update_response<C: ConnectionTrait>(
    db: &C,
    company: &company::Model,
) -> Result<TagUpdateResponse, ServiceError> {
    let tags = get_tags_for_company(db, company.id).await?;
    Ok(TagUpdateResponse {
        company_id: company.id,
        tags: tags.into_iter().map(CompanyTagSchema::from).collect(),
    })
}

/// Attaches a tag to a company.
///
/// The insert is a single statement with no read lock held before it. A
/// second attach of the same pair is rejected by the `unique_company_tag`
/// index and surfaces as [`ServiceError::DuplicateCompanyTag`], also when two
/// requests race.
pub async fn add_tag_to_company(
    db: &DatabaseConnection,
    company_id: i32,
    tag_id: i32,
) -> Result<TagUpdateResponse, ServiceError> {
    let (company, tag) = find_company_and_tag(db, company_id, tag_id).await?;

    let now = Utc::now();
    let inserted = company_tag::ActiveModel {
        company_id: Set(company.id),
        tag_id: Set(tag.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await;

    if let Err(db_err) = inserted {
        return Err(match db_err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                ServiceError::DuplicateCompanyTag { company_id, tag_id }
            }
            // Company or tag deleted after the checks above.
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                match find_company_and_tag(db, company_id, tag_id).await {
                    Err(not_found) => not_found,
                    Ok(_) => ServiceError::Database(db_err),
                }
            }
            _ => ServiceError::Database(db_err),
        });
    }

    info!(company_id, tag_id, "Tag attached to company.");
    tag_update_response(db, &company).await
}

/// Detaches a tag from a company. Detaching a tag that is not attached
/// leaves the tag set unchanged and is not an error.
pub async fn remove_tag_from_company(
    db: &DatabaseConnection,
    company_id: i32,
    tag_id: i32,
) -> Result<TagUpdateResponse, ServiceError> {
    let (company, tag) = find_company_and_tag(db, company_id, tag_id).await?;

    let delete_result = company_tag::Entity::delete_many()
        .filter(company_tag::Column::CompanyId.eq(company.id))
        .filter(company_tag::Column::TagId.eq(tag.id))
        .exec(db)
        .await?;
    debug!(
        company_id,
        tag_id,
        rows_affected = delete_result.rows_affected,
        "Removed company tag association."
    );

    tag_update_response(db, &company).await
}
