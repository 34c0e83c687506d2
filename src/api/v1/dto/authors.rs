/*
 * Responsibility
 * - authors の response DTO
 */
use chrono::NaiveDate;
use serde::Serialize;

use crate::repos::author_repo::AuthorRow;

#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub date_of_death: Option<NaiveDate>,
}

impl From<AuthorRow> for AuthorResponse {
    fn from(row: AuthorRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            date_of_birth: row.date_of_birth,
            date_of_death: row.date_of_death,
        }
    }
}
