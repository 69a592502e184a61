pub mod email;
pub mod session;
pub mod streak;
