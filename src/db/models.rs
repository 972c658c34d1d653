use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::db::entities::{company, tag};

// --- Transfer Schemas ---

/// Tag as nested inside company payloads.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompanyTagSchema {
    pub id: i32,
    pub name: Option<String>,
    pub number: i32,
}

impl From<tag::Model> for CompanyTagSchema {
    fn from(model: tag::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            number: model.number,
        }
    }
}

/// Autocomplete hit: only the identity and the three display names.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AutocompletedCompanySchema {
    pub id: i32,
    pub name_ko: Option<String>,
    pub name_en: Option<String>,
    pub name_ja: Option<String>,
}

impl From<company::Model> for AutocompletedCompanySchema {
    fn from(model: company::Model) -> Self {
        Self {
            id: model.id,
            name_ko: model.name_ko,
            name_en: model.name_en,
            name_ja: model.name_ja,
        }
    }
}

/// A company together with every tag attached to it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompanySchema {
    pub id: i32,
    pub name_ko: Option<String>,
    pub name_en: Option<String>,
    pub name_ja: Option<String>,
    pub tags: Vec<CompanyTagSchema>,
}

impl CompanySchema {
    pub fn from_models(company: company::Model, tags: Vec<tag::Model>) -> Self {
        Self {
            id: company.id,
            name_ko: company.name_ko,
            name_en: company.name_en,
            name_ja: company.name_ja,
            tags: tags.into_iter().map(CompanyTagSchema::from).collect(),
        }
    }
}

/// Offset/limit pagination envelope.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

impl<T> Paginated<T> {
    pub fn empty(total: u64, offset: u64, limit: u64) -> Self {
        Self {
            items: Vec::new(),
            total,
            limit,
            offset,
        }
    }
}

pub type PaginatedAutocompleteResponse = Paginated<AutocompletedCompanySchema>;
pub type PaginatedCompanyResponse = Paginated<CompanySchema>;

/// Result of attaching or detaching a tag: the company's full tag set afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TagUpdateResponse {
    pub company_id: i32,
    pub tags: Vec<CompanyTagSchema>,
}

// --- Pagination Window ---

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;
/// Offsets are bound as signed 64-bit integers by every backend.
pub const MAX_OFFSET: u64 = i64::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageWindowError {
    #[error("limit must be between 1 and {MAX_LIMIT}, got {0}")]
    LimitOutOfRange(u64),
    #[error("offset must be at most {MAX_OFFSET}, got {0}")]
    OffsetOutOfRange(u64),
}

impl PageWindow {
    pub fn new(offset: u64, limit: u64) -> Result<Self, PageWindowError> {
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(PageWindowError::LimitOutOfRange(limit));
        }
        if offset > MAX_OFFSET {
            return Err(PageWindowError::OffsetOutOfRange(offset));
        }
        Ok(Self { offset, limit })
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

// --- Tag Token ---

const TAG_TOKEN_PREFIX: &str = "tag";

/// Parsed form of the `tag_<number>` path token. Carries the tag *number*,
/// not its surrogate id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagToken {
    pub number: i32,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagTokenError {
    #[error("tag token '{0}' has no '_' separator")]
    MissingSeparator(String),
    #[error("tag token '{0}' must start with 'tag_'")]
    UnknownPrefix(String),
    #[error("tag token '{0}' does not end in an integer")]
    InvalidNumber(String),
}

impl FromStr for TagToken {
    type Err = TagTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, number) = s
            .split_once('_')
            .ok_or_else(|| TagTokenError::MissingSeparator(s.to_owned()))?;
        if prefix != TAG_TOKEN_PREFIX {
            return Err(TagTokenError::UnknownPrefix(s.to_owned()));
        }
        let number = number
            .parse::<i32>()
            .map_err(|_| TagTokenError::InvalidNumber(s.to_owned()))?;
        Ok(TagToken { number })
    }
}

impl fmt::Display for TagToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TAG_TOKEN_PREFIX}_{}", self.number)
    }
}
