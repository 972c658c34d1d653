//! SeaORM entities for the company directory tables.

pub mod company;
pub mod company_tag;
pub mod tag;

// Prelude module for easy importing of the entities
pub mod prelude {
    pub use super::company::Entity as Company;
    pub use super::tag::Entity as Tag;
    pub use super::company_tag::Entity as CompanyTag;
    pub use super::company_tag::Column as CompanyTagColumn;
}
