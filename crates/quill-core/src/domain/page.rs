use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::block::ContentBlock;
use super::reconcile::{validate_content_mix, validate_positions};
use crate::error::DomainError;

pub const TITLE_MIN_CHARS: usize = 2;
pub const TITLE_MAX_CHARS: usize = 160;

/// Publication state, derived from the publication date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Draft,
    Scheduled,
    Published,
}

impl PageStatus {
    pub fn of(publication_date: Option<NaiveDate>, today: NaiveDate) -> Self {
        match publication_date {
            None => Self::Draft,
            Some(date) if date > today => Self::Scheduled,
            Some(_) => Self::Published,
        }
    }
}

/// Page metadata without content, as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    pub author: Option<String>,
    pub creation_date: NaiveDate,
    pub publication_date: Option<NaiveDate>,
}

impl PageSummary {
    pub fn status(&self, today: NaiveDate) -> PageStatus {
        PageStatus::of(self.publication_date, today)
    }
}

/// Page with its blocks ordered by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(flatten)]
    pub summary: PageSummary,
    pub blocks: Vec<ContentBlock>,
}

impl Page {
    pub fn id(&self) -> i64 {
        self.summary.id
    }

    pub fn status(&self, today: NaiveDate) -> PageStatus {
        self.summary.status(today)
    }

    /// Anonymous visitors only get to see published pages.
    pub fn is_visible_to_public(&self, today: NaiveDate) -> bool {
        self.status(today) == PageStatus::Published
    }
}

/// Page-level fields written on create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFields {
    pub title: String,
    pub author_id: i64,
    pub creation_date: NaiveDate,
    pub publication_date: Option<NaiveDate>,
}

/// Page fields as submitted for a create or an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDraft {
    pub fields: PageFields,
    pub blocks: Vec<ContentBlock>,
}

impl PageDraft {
    /// Check the page-level fields and the submitted block list.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_title(&self.fields.title)?;

        if let Some(publication_date) = self.fields.publication_date {
            if self.fields.creation_date > publication_date {
                return Err(DomainError::Validation(
                    "creation date cannot be after the publication date".to_string(),
                ));
            }
        }

        validate_positions(&self.blocks)?;
        validate_content_mix(&self.blocks)?;
        Ok(())
    }
}

/// Titles (page and site) are 2 to 160 characters long.
pub fn validate_title(title: &str) -> Result<(), DomainError> {
    let length = title.chars().count();
    if (TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&length) {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "title must be between {} and {} characters",
            TITLE_MIN_CHARS, TITLE_MAX_CHARS
        )))
    }
}

/// Order pages by publication date, oldest first, drafts last.
pub fn sort_by_publication_date(pages: &mut [PageSummary]) {
    pages.sort_by(|a, b| match (a.publication_date, b.publication_date) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ContentError;
    use crate::domain::block::BlockKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn summary(id: i64, publication_date: Option<NaiveDate>) -> PageSummary {
        PageSummary {
            id,
            title: format!("Page {}", id),
            author_id: 1,
            author: None,
            creation_date: date(2023, 1, 1),
            publication_date,
        }
    }

    fn draft() -> PageDraft {
        PageDraft {
            fields: PageFields {
                title: "Hello".to_string(),
                author_id: 1,
                creation_date: date(2023, 6, 1),
                publication_date: Some(date(2023, 6, 2)),
            },
            blocks: vec![
                ContentBlock::local("local-1", BlockKind::Header, "Hi", 1),
                ContentBlock::local("local-2", BlockKind::Paragraph, "There", 2),
            ],
        }
    }

    #[test]
    fn test_status_derivation() {
        let today = date(2023, 6, 15);

        assert_eq!(PageStatus::of(None, today), PageStatus::Draft);
        assert_eq!(PageStatus::of(Some(date(2023, 6, 16)), today), PageStatus::Scheduled);
        assert_eq!(PageStatus::of(Some(today), today), PageStatus::Published);
        assert_eq!(PageStatus::of(Some(date(2022, 1, 1)), today), PageStatus::Published);
    }

    #[test]
    fn test_sort_puts_drafts_last() {
        let mut pages = vec![
            summary(1, None),
            summary(2, Some(date(2023, 5, 1))),
            summary(3, Some(date(2023, 1, 1))),
            summary(4, None),
        ];

        sort_by_publication_date(&mut pages);

        let ids: Vec<i64> = pages.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_valid_draft() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn test_title_length_counts_chars() {
        let mut page = draft();
        page.fields.title = "é".to_string();
        assert!(matches!(page.validate(), Err(DomainError::Validation(_))));

        page.fields.title = "é".repeat(160);
        assert!(page.validate().is_ok());

        page.fields.title = "a".repeat(161);
        assert!(matches!(page.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_creation_after_publication_rejected() {
        let mut page = draft();
        page.fields.creation_date = date(2023, 7, 1);
        assert!(matches!(page.validate(), Err(DomainError::Validation(_))));

        page.fields.publication_date = None;
        assert!(page.validate().is_ok());
    }

    #[test]
    fn test_block_errors_surface_as_content_errors() {
        let mut page = draft();
        page.blocks.pop();

        assert!(matches!(
            page.validate(),
            Err(DomainError::Content(ContentError::InsufficientContent))
        ));
    }

    #[test]
    fn test_page_serializes_flat() {
        let page = Page {
            summary: summary(9, None),
            blocks: draft().blocks,
        };

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["id"], 9);
        assert_eq!(json["blocks"].as_array().unwrap().len(), 2);
        assert!(!page.is_visible_to_public(date(2030, 1, 1)));
    }
}
