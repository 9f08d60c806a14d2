use serde::{Deserialize, Serialize};

use super::page::PageSummary;

/// What a user may do besides managing their own pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Author,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "author" => Some(Self::Author),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// User entity - an author or administrator of the site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins manage every page, authors only their own.
    pub fn can_manage(&self, page: &PageSummary) -> bool {
        self.is_admin() || page.author_id == self.id
    }
}
