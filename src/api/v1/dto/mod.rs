pub mod account;
pub mod authors;
pub mod books;
