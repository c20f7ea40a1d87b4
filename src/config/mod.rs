mod loader;
mod types;

pub use loader::{CONFIG_FILE, default_path, load};
pub use types::{Check, CommandLine, Config};
