//! The `services` module is the data-access layer of the company directory.
//! It owns every query against the `companies`, `tags` and `company_tags`
//! tables and hands back transfer schemas from `db::models`, so HTTP handlers
//! never touch entities directly.

use sea_orm::DbErr;
use thiserror::Error;

use crate::db::models::TagTokenError;

pub mod company_service;
pub mod tag_service;

pub use company_service::*;
pub use tag_service::*;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Company not found")]
    CompanyNotFound,
    #[error("Tag not found")]
    TagNotFound,
    #[error("{matches} companies share the name '{name}'")]
    AmbiguousCompanyName { name: String, matches: usize },
    #[error("Tag {tag_id} is already attached to company {company_id}")]
    DuplicateCompanyTag { company_id: i32, tag_id: i32 },
    #[error("A tag with number {0} already exists")]
    DuplicateTagNumber(i32),
    #[error(transparent)]
    InvalidTagToken(#[from] TagTokenError),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

