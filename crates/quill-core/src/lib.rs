//! # Quill Core
//!
//! The domain layer of the Quill CMS.
//! Pages, content blocks and the reconciliation rules that keep a page's
//! block ordering consistent. This crate performs no I/O.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{ContentError, DomainError, RepoError};
