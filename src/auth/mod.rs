pub mod jwt;

pub use jwt::{create_token, verify_jwt, Claims};
