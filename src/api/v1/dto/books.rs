/*
 * Responsibility
 * - books の request/response DTO
 * - publish_date は "YYYY-MM-DD" (chrono の serde 形式)。形式違いは JSON の rejection で 400
 */
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::repos::book_repo::BookRow;
use crate::services::catalog::BookInput;

pub const TITLE_REQUIRED: &str = "Title is required";
pub const PUBLISH_DATE_REQUIRED: &str = "Publish date is required";
pub const AUTHOR_REQUIRED: &str = "Author id is required";

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    #[serde(default)]
    pub title: String,
    pub publish_date: Option<NaiveDate>,
    pub author_id: Option<i64>,
}

impl BookRequest {
    /// Required-field check; on success the request becomes service input.
    pub fn validate(self) -> Result<BookInput, &'static str> {
        if self.title.trim().is_empty() {
            return Err(TITLE_REQUIRED);
        }
        let publish_date = self.publish_date.ok_or(PUBLISH_DATE_REQUIRED)?;
        let author_id = self.author_id.ok_or(AUTHOR_REQUIRED)?;

        Ok(BookInput {
            title: self.title,
            publish_date,
            author_id,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub publish_date: NaiveDate,
    pub author_id: i64,
}

impl From<BookRow> for BookResponse {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            publish_date: row.publish_date,
            author_id: row.author_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> BookRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn required_fields_are_checked_in_order() {
        let req = parse(r#"{"title": " ", "publish_date": "1939-04-14", "author_id": 1}"#);
        assert_eq!(req.validate().unwrap_err(), TITLE_REQUIRED);

        let req = parse(r#"{"title": "T", "author_id": 1}"#);
        assert_eq!(req.validate().unwrap_err(), PUBLISH_DATE_REQUIRED);

        let req = parse(r#"{"title": "T", "publish_date": "1939-04-14"}"#);
        assert_eq!(req.validate().unwrap_err(), AUTHOR_REQUIRED);

        let input = parse(r#"{"title": "T", "publish_date": "1939-04-14", "author_id": 1}"#)
            .validate()
            .unwrap();
        assert_eq!(input.publish_date, NaiveDate::from_ymd_opt(1939, 4, 14).unwrap());
    }

    #[test]
    fn response_writes_iso_date() {
        let json = serde_json::to_value(BookResponse {
            id: 1,
            title: "East of Eden".to_string(),
            publish_date: NaiveDate::from_ymd_opt(1952, 9, 19).unwrap(),
            author_id: 1,
        })
        .unwrap();
        assert_eq!(json["publish_date"], "1952-09-19");
    }
}
