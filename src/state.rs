/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - Clone 前提で持つ (内部は Arc で cheap)
 */
use crate::services::{account::AccountService, catalog::CatalogService};

#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub catalog: CatalogService,
}

impl AppState {
    pub fn new(accounts: AccountService, catalog: CatalogService) -> Self {
        Self { accounts, catalog }
    }
}
