pub mod loader;

pub use loader::{parse_image, read_image};
