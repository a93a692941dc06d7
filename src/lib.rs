pub mod cddb;
pub mod cdrom_sys;
pub mod disc_reader;
pub mod toc;

pub use disc_reader::{DiscError, Result};
