pub mod filesystem;

pub use filesystem::{download_name, FileStorage};
