pub mod chat;
pub mod documents;
pub mod report;
