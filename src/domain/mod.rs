pub mod ai;
pub mod analytics;
pub mod chat;
pub mod company;
pub mod embed;
pub mod file;
pub mod form;
pub mod health;
pub mod prompt;
pub mod submission;
pub mod user;
