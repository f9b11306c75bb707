pub mod auth;
pub mod catalog;
pub mod password;
pub mod storage;
pub mod token;
