pub mod admin;
pub mod blog;
pub mod images;
pub mod plan;
