//! SeaORM entities for the CMS tables.

pub mod content;
pub mod image;
pub mod page;
pub mod site;
pub mod user;
