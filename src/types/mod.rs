pub mod account;
pub mod note;
