use chrono::Utc;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, LoaderTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{debug, error};

use super::tag_service::get_tags_for_company;
use super::ServiceError;
use crate::db::entities::{company, company_tag, tag};
use crate::db::models::{
    AutocompletedCompanySchema, CompanySchema, PageWindow, Paginated,
    PaginatedAutocompleteResponse, PaginatedCompanyResponse, TagToken,
};

// --- Company Service Functions ---

const NAME_COLUMNS: [company::Column; 3] = [
    company::Column::NameKo,
    company::Column::NameEn,
    company::Column::NameJa,
];

const LIKE_ESCAPE: char = '\\';

/// Escapes LIKE metacharacters so user input is matched literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// `lower(name_ko) LIKE lower('%needle%') OR lower(name_en) LIKE ... OR ...`
///
/// Both sides are folded by the database, so they agree under whatever case
/// rules the backend's `lower()` implements.
fn any_name_contains(needle: &str) -> Condition {
    let pattern = format!("%{}%", escape_like(needle));
    let template = format!("LOWER($1) LIKE LOWER($2) ESCAPE '{LIKE_ESCAPE}'");
    NAME_COLUMNS.iter().fold(Condition::any(), |cond, column| {
        cond.add(Expr::cust_with_exprs(
            template.as_str(),
            [
                SimpleExpr::from(Expr::col((company::Entity, *column))),
                SimpleExpr::from(Expr::val(pattern.as_str())),
            ],
        ))
    })
}

fn any_name_equals(name: &str) -> Condition {
    NAME_COLUMNS
        .iter()
        .fold(Condition::any(), |cond, column| cond.add(column.eq(name)))
}

/// Creates a company. Any of the three names may be absent.
pub async fn create_company(
    db: &DatabaseConnection,
    name_ko: Option<&str>,
    name_en: Option<&str>,
    name_ja: Option<&str>,
) -> Result<company::Model, ServiceError> {
    let now = Utc::now();
    let new_company = company::ActiveModel {
        name_ko: Set(name_ko.map(str::to_owned)),
        name_en: Set(name_en.map(str::to_owned)),
        name_ja: Set(name_ja.map(str::to_owned)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default() // id will be set by the database
    };
    Ok(new_company.insert(db).await?)
}

/// Autocomplete search: case-insensitive substring match on any of the three
/// names. `total` counts every match; `items` holds only the requested window.
pub async fn list_companies_autocomplete(
    db: &DatabaseConnection,
    company_name: &str,
    window: PageWindow,
) -> Result<PaginatedAutocompleteResponse, ServiceError> {
    let query = company::Entity::find().filter(any_name_contains(company_name));

    let total = query.clone().count(db).await?;

    let companies = query
        .order_by_asc(company::Column::Id)
        .offset(window.offset)
        .limit(window.limit)
        .all(db)
        .await?;

    debug!(
        company_name,
        total,
        returned = companies.len(),
        "Autocomplete search finished."
    );

    Ok(Paginated {
        items: companies
            .into_iter()
            .map(AutocompletedCompanySchema::from)
            .collect(),
        total,
        limit: window.limit,
        offset: window.offset,
    })
}

/// Exact lookup on any of the three names.
///
/// Returns `Ok(None)` when nothing matches. More than one match means the
/// directory holds duplicate names, which is reported as
/// [`ServiceError::AmbiguousCompanyName`] rather than guessing.
pub async fn get_company_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<CompanySchema>, ServiceError> {
    let mut matches = company::Entity::find()
        .filter(any_name_equals(name))
        .order_by_asc(company::Column::Id)
        .all(db)
        .await?;

    if matches.len() > 1 {
        let ids: Vec<i32> = matches.iter().map(|c| c.id).collect();
        error!(name, ?ids, "Exact name lookup matched more than one company.");
        return Err(ServiceError::AmbiguousCompanyName {
            name: name.to_owned(),
            matches: matches.len(),
        });
    }

    let Some(company) = matches.pop() else {
        return Ok(None);
    };
    let tags = get_tags_for_company(db, company.id).await?;
    Ok(Some(CompanySchema::from_models(company, tags)))
}

/// Lists the companies carrying the tag addressed by `tag_token`
/// (`tag_<number>`), each with its full tag list.
pub async fn list_companies_by_tag(
    db: &DatabaseConnection,
    tag_token: &str,
    window: PageWindow,
) -> Result<PaginatedCompanyResponse, ServiceError> {
    let token: TagToken = tag_token.parse()?;

    let tag = tag::Entity::find()
        .filter(tag::Column::Number.eq(token.number))
        .one(db)
        .await?
        .ok_or_else(|| {
            debug!(tag = %token, "No tag with this number.");
            ServiceError::TagNotFound
        })?;

    let total = company_tag::Entity::find()
        .filter(company_tag::Column::TagId.eq(tag.id))
        .count(db)
        .await?;
    if total == 0 {
        return Ok(Paginated::empty(0, window.offset, window.limit));
    }

    let companies = tag
        .find_related(company::Entity)
        .order_by_asc(company::Column::Id)
        .offset(window.offset)
        .limit(window.limit)
        .all(db)
        .await?;

    // One query for the tags of every company on this page.
    let tags_per_company = companies
        .load_many_to_many(tag::Entity, company_tag::Entity, db)
        .await?;

    let items = companies
        .into_iter()
        .zip(tags_per_company)
        .map(|(company, tags)| CompanySchema::from_models(company, tags))
        .collect();

    Ok(Paginated {
        items,
        total,
        limit: window.limit,
        offset: window.offset,
    })
}
