pub mod authentication;
pub mod note;
