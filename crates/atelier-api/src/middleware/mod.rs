pub mod audit;
pub mod security_headers;

pub use security_headers::{security_headers_middleware, SecurityHeadersConfig};
