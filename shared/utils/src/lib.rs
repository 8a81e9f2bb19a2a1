pub mod config;
pub mod error;
pub mod logging;
pub mod text;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use text::*;
