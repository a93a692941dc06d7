//! Targets without a known CD-ROM interface.

use std::path::Path;

use crate::{
    disc_reader::{DiscError, Result, TocSource},
    toc::TocHeader,
};

pub const DEFAULT_DEVICE: &str = "/dev/cdrom";

pub struct CdromDevice {
    _private: (),
}

impl CdromDevice {
    pub fn open(_path: &Path) -> Result<Self> {
        Err(DiscError::Unsupported)
    }
}

impl TocSource for CdromDevice {
    fn read_header(&mut self) -> Result<TocHeader> {
        Err(DiscError::Unsupported)
    }

    fn read_entries(&mut self, _: &TocHeader, _: &mut [u32], _: &mut Vec<DiscError>) {}
}
