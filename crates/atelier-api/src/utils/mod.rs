pub mod ip_extraction;
pub mod multipart;

pub use ip_extraction::{client_ip_from_parts, ClientIp};
pub use multipart::extract_artwork_form;
