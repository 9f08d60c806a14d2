//! Data Transfer Objects - request/response types for the API.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use quill_core::domain::{
    ContentBlock, Page, PageDraft, PageFields, PageStatus, PageSummary, Role, User,
};

/// Request to open a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// A user's public information. Password hashes never leave the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub role: Role,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Response to a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Page as submitted for create and update.
///
/// Blocks already saved carry their numeric id; blocks added in the editor
/// carry a string placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    pub author_id: i64,
    pub creation_date: NaiveDate,
    #[serde(default, deserialize_with = "blank_date_as_none")]
    pub publication_date: Option<NaiveDate>,
    #[serde(alias = "contents")]
    pub blocks: Vec<ContentBlock>,
}

/// Drafts may arrive with `""` for their publication date.
fn blank_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(date) => date
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

impl PageRequest {
    pub fn into_draft(self) -> PageDraft {
        PageDraft {
            fields: PageFields {
                title: self.title.trim().to_string(),
                author_id: self.author_id,
                creation_date: self.creation_date,
                publication_date: self.publication_date,
            },
            blocks: self.blocks,
        }
    }
}

/// Listing entry with its derived publication status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSummaryResponse {
    #[serde(flatten)]
    pub summary: PageSummary,
    pub status: PageStatus,
}

impl PageSummaryResponse {
    pub fn new(summary: PageSummary, today: NaiveDate) -> Self {
        let status = summary.status(today);
        Self { summary, status }
    }
}

/// Full page with blocks ordered by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse {
    #[serde(flatten)]
    pub page: Page,
    pub status: PageStatus,
}

impl PageResponse {
    pub fn new(page: Page, today: NaiveDate) -> Self {
        let status = page.status(today);
        Self { page, status }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleResponse {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::domain::{BlockId, BlockKind};
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_page_request_accepts_stored_and_local_ids() {
        let body = json!({
            "id": 4,
            "title": "  Harbour walk ",
            "author_id": 2,
            "creation_date": "2024-03-01",
            "publication_date": null,
            "contents": [
                { "id": 11, "type": "header", "text": "Harbour walk", "position": 1 },
                { "id": "local-1", "type": "paragraph", "text": "Fog again.", "position": 2 }
            ]
        });

        let request: PageRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.blocks[0].id, BlockId::Stored(11));
        assert_eq!(request.blocks[1].id, BlockId::Local("local-1".to_string()));

        let draft = request.into_draft();
        assert_eq!(draft.fields.title, "Harbour walk");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_blank_publication_date_means_draft() {
        for blank in ["", "   "] {
            let body = json!({
                "title": "Harbour walk",
                "author_id": 2,
                "creation_date": "2024-03-01",
                "publication_date": blank,
                "blocks": []
            });

            let request: PageRequest = serde_json::from_value(body).unwrap();
            assert_eq!(request.publication_date, None);
        }
    }

    #[test]
    fn test_publication_date_parsed_or_rejected() {
        let mut body = json!({
            "title": "Harbour walk",
            "author_id": 2,
            "creation_date": "2024-03-01",
            "publication_date": "2024-03-05",
            "blocks": []
        });

        let request: PageRequest = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(request.publication_date, Some(date(2024, 3, 5)));

        body["publication_date"] = json!("next week");
        assert!(serde_json::from_value::<PageRequest>(body).is_err());
    }

    #[test]
    fn test_unknown_block_kind_rejected() {
        let body = json!({
            "title": "Harbour walk",
            "author_id": 2,
            "creation_date": "2024-03-01",
            "blocks": [{ "id": 1, "type": "video", "text": "x", "position": 1 }]
        });

        assert!(serde_json::from_value::<PageRequest>(body).is_err());
    }

    #[test]
    fn test_page_response_is_flat_with_status() {
        let page = Page {
            summary: PageSummary {
                id: 4,
                title: "Harbour walk".to_string(),
                author_id: 2,
                author: Some("ada".to_string()),
                creation_date: date(2024, 3, 1),
                publication_date: Some(date(2024, 3, 2)),
            },
            blocks: vec![ContentBlock::stored(11, BlockKind::Header, "Harbour walk", 1)],
        };

        let value = serde_json::to_value(PageResponse::new(page, date(2024, 6, 1))).unwrap();

        assert_eq!(value["id"], 4);
        assert_eq!(value["author"], "ada");
        assert_eq!(value["status"], "published");
        assert_eq!(value["blocks"][0]["type"], "header");
        assert_eq!(value["blocks"][0]["id"], 11);
    }

    #[test]
    fn test_user_response_omits_password_hash() {
        let user = User {
            id: 1,
            username: "ada".to_string(),
            name: "Ada".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Admin,
        };

        let value = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["role"], "admin");
    }
}
