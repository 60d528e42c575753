pub mod admin;

pub use admin::{AdminCode, ADMIN_CODE_HEADER};
