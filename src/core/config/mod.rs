pub mod data;
pub mod io;
pub mod printing;

pub use data::{path_display, Config, SettingError};
pub use io::ConfigError;
