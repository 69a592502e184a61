pub mod magic_link;
pub mod note;
pub mod user;
