// Middleware modules for the scam check backend

pub mod cors;

pub use cors::{dynamic_cors_middleware, CorsPolicy};
