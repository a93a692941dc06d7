//! FreeBSD and DragonFly `<sys/cdio.h>` access.
//!
//! The driver reports LBA addresses in network byte order.

use std::{fs::File, mem::size_of, path::Path};

use libc::c_ulong;
use log::debug;
use static_assertions::assert_eq_size;

use super::{
    ioccom::{ior, iowr},
    ioctl, open_device,
};
use crate::{
    disc_reader::{DiscError, Result, TocSource},
    toc::{TocHeader, CDROM_LEADOUT},
};

pub const DEFAULT_DEVICE: &str = "/dev/cdrom";

/// first frame is 0
const CD_LBA_FORMAT: u8 = 1;

/// struct ioc_toc_header
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct IocTocHeader {
    len: u16,
    starting_track: u8,
    ending_track: u8,
}
assert_eq_size!(IocTocHeader, [u8; 4]);

/// struct cd_toc_entry
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct CdTocEntry {
    _reserved0: u8,
    /// control:4, addr_type:4
    control_addr_type: u8,
    track: u8,
    _reserved1: u8,
    /// union msf_lba, big-endian lba
    addr: u32,
}
assert_eq_size!(CdTocEntry, [u8; 8]);

/// struct ioc_read_toc_single_entry
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct IocReadTocSingleEntry {
    address_format: u8,
    track: u8,
    entry: CdTocEntry,
}
assert_eq_size!(IocReadTocSingleEntry, [u8; 12]);

const CDIOREADTOCHEADER: c_ulong = ior(b'c', 4, size_of::<IocTocHeader>());
const CDIOREADTOCENTRY: c_ulong = iowr(b'c', 6, size_of::<IocReadTocSingleEntry>());

pub struct CdromDevice {
    file: File,
}

impl CdromDevice {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            file: open_device(path)?,
        })
    }

    fn read_entry(&mut self, track: u8) -> Result<u32> {
        let mut request = IocReadTocSingleEntry {
            address_format: CD_LBA_FORMAT,
            track,
            ..Default::default()
        };
        unsafe { ioctl(&self.file, "CDIOREADTOCENTRY", CDIOREADTOCENTRY, &mut request)? };
        let lba = u32::from_be(request.entry.addr);
        debug!("read_entry: track={:#x} lba={}", track, lba);
        Ok(lba)
    }
}

impl TocSource for CdromDevice {
    fn read_header(&mut self) -> Result<TocHeader> {
        let mut hdr = IocTocHeader::default();
        unsafe { ioctl(&self.file, "CDIOREADTOCHEADER", CDIOREADTOCHEADER, &mut hdr)? };
        Ok(TocHeader {
            first_track: hdr.starting_track,
            last_track: hdr.ending_track,
        })
    }

    fn read_entries(
        &mut self,
        header: &TocHeader,
        entries: &mut [u32],
        warnings: &mut Vec<DiscError>,
    ) {
        let last = header.last_track as usize;
        for (i, slot) in entries.iter_mut().enumerate() {
            let track = if i < last { i as u8 + 1 } else { CDROM_LEADOUT };
            match self.read_entry(track) {
                Ok(lba) => *slot = lba,
                Err(e) => warnings.push(e),
            }
        }
    }
}
