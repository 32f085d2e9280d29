pub mod artworks;
pub mod engagement;
pub mod health;
pub mod media;
