/*
 * Responsibility
 * - books の作成・更新・取得・削除と authors の取得
 * - 業務ルール: 存在しない id は 404、既存と同じ title は 409、author は実在すること
 */
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::error::AppError;
use crate::repos::author_repo::{AuthorRepo, AuthorRow};
use crate::repos::book_repo::{BookRepo, BookRow, NewBook};
use crate::repos::error::RepoError;

const BOOK_EXISTS: &str = "Book with the same title already exists";

fn book_not_found(book_id: i64) -> AppError {
    AppError::not_found(format!("Book with id {book_id} was not found"))
}

fn author_not_found(author_id: i64) -> AppError {
    AppError::not_found(format!("Author with id {author_id} was not found"))
}

fn title_conflict(e: RepoError) -> AppError {
    match e {
        RepoError::Conflict => AppError::conflict(BOOK_EXISTS),
    }
}

#[derive(Debug, Clone)]
pub struct BookInput {
    pub title: String,
    pub publish_date: NaiveDate,
    pub author_id: i64,
}

impl BookInput {
    fn into_new_book(self) -> NewBook {
        NewBook {
            title: self.title.trim().to_string(),
            publish_date: self.publish_date,
            author_id: self.author_id,
        }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    books: Arc<dyn BookRepo>,
    authors: Arc<dyn AuthorRepo>,
}

impl CatalogService {
    pub fn new(books: Arc<dyn BookRepo>, authors: Arc<dyn AuthorRepo>) -> Self {
        Self { books, authors }
    }

    pub async fn create_book(&self, input: BookInput) -> Result<BookRow, AppError> {
        self.ensure_author(input.author_id).await?;

        let row = self
            .books
            .create(input.into_new_book())
            .await
            .map_err(title_conflict)?;

        info!(book_id = row.id, "book created");
        Ok(row)
    }

    pub async fn update_book(&self, book_id: i64, input: BookInput) -> Result<BookRow, AppError> {
        // a missing book wins over a missing author
        self.get_book(book_id).await?;
        self.ensure_author(input.author_id).await?;

        self.books
            .update(book_id, input.into_new_book())
            .await
            .map_err(title_conflict)?
            .ok_or_else(|| book_not_found(book_id))
    }

    pub async fn get_book(&self, book_id: i64) -> Result<BookRow, AppError> {
        self.books
            .get(book_id)
            .await?
            .ok_or_else(|| book_not_found(book_id))
    }

    pub async fn delete_book(&self, book_id: i64) -> Result<(), AppError> {
        if !self.books.delete(book_id).await? {
            return Err(book_not_found(book_id));
        }

        info!(book_id, "book deleted");
        Ok(())
    }

    pub async fn get_author(&self, author_id: i64) -> Result<AuthorRow, AppError> {
        self.authors
            .get(author_id)
            .await?
            .ok_or_else(|| author_not_found(author_id))
    }

    async fn ensure_author(&self, author_id: i64) -> Result<(), AppError> {
        self.get_author(author_id).await.map(|_| ())
    }
}
