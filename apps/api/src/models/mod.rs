pub mod catalog;
pub mod conversation;
pub mod user;
