// handlers/mod.rs - HTTP surface of the mock endpoint
//
// exec   → GET|POST / and /exec, the single mock endpoint (token required)
// health → GET /health and the envelope-shaped 404 fallback

pub mod exec;
pub mod health;

pub use exec::{exec_get, exec_post};
pub use health::{health, not_found};
