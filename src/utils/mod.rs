pub mod config;
pub mod logger;
pub mod wordlist_file;
pub mod zipcrack_toml;

pub use config::*;
pub use logger::setup_logging;
pub use wordlist_file::write_wordlist;
