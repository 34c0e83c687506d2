/*
 * Responsibility
 * - repo が上位に伝える意味の定義
 */
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepoError {
    #[error("conflict")]
    Conflict,
}

pub type RepoResult<T> = Result<T, RepoError>;
