pub mod url;
pub mod user;

pub use url::PostgresUrlRepository;
pub use user::PostgresUserRepository;
