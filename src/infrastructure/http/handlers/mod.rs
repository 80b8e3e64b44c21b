//! HTTP Handlers

mod audio;
mod health;
mod synthesis;
mod voice;

pub use audio::*;
pub use health::*;
pub use synthesis::*;
pub use voice::*;
