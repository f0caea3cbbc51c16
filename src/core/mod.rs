pub mod app;
pub mod catalog;
pub mod chat_stream;
pub mod config;
pub mod message;
pub mod preferences;
pub mod storage;
pub mod transcript;
