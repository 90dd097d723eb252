pub mod comment;
pub mod movie;
pub mod review;
pub mod session;
pub mod user;
