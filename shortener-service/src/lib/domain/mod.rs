pub mod url;
pub mod user;
