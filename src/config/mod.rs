pub mod settings;
pub mod jwt;
pub mod media;
pub mod chat;
