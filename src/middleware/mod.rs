/*
 * Responsibility
 * - middleware の公開インターフェース
 */
pub mod auth;
pub mod http;
