pub mod dto;
pub mod handler;
pub mod script;
pub mod service;
