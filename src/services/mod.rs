//! Service layer
//!
//! File, stream and codec handling kept apart from the partition engine.

pub mod format;
pub mod io;

pub use format::OutputFormatHandler;
pub use io::ImageIOService;
