//! Object store adapters.

mod cloudinary;
mod memory;

pub use cloudinary::{CloudinarySettings, CloudinaryStore};
pub use memory::InMemoryStore;
