pub mod account;
pub mod auth;
pub mod catalog;
pub mod clock;
pub mod password;
