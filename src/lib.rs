/*
 * Responsibility
 * - モジュール構成の宣言 (main.rs と tests から使う)
 */
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
