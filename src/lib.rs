pub mod catalog;
pub mod error;
pub mod extraction;
pub mod history;
pub mod matching;
pub mod models;
pub mod search;
pub mod server;
pub mod utils;
