pub mod magic_link;
pub mod note;
pub mod postgres_repository;
pub mod user;
