/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 */
use crate::services::auth::{Claim, Identity};

/// 認証済みのリクエストに付与されるコンテキスト
#[derive(Debug, Clone)]
pub struct AuthCtx {
    identity: Identity,
}

impl AuthCtx {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn email(&self) -> Option<&str> {
        self.identity.email()
    }

    pub fn claims(&self) -> &[Claim] {
        self.identity.claims()
    }
}
