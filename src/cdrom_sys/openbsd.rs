//! OpenBSD and NetBSD `<sys/cdio.h>` access.
//!
//! The whole table, lead-out included, comes back from one
//! `CDIOREADTOCENTRYS` call.

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
    toc::TocHeader,
};

pub const DEFAULT_DEVICE: &str = "/dev/cd0a";

/// first frame is 0
const CD_LBA_FORMAT: u8 = 1;

// OpenBSD counts the table from 0, NetBSD from the first track
#[cfg(target_os = "openbsd")]
const STARTING_TRACK: u8 = 0;
#[cfg(target_os = "netbsd")]
const STARTING_TRACK: u8 = 1;

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
    /// union msf_lba
    addr: u32,
}
assert_eq_size!(CdTocEntry, [u8; 8]);

/// struct ioc_read_toc_entry
#[repr(C)]
struct IocReadTocEntry {
    address_format: u8,
    starting_track: u8,
    data_len: u16,
    data: *mut CdTocEntry,
}

const CDIOREADTOCHEADER: c_ulong = ior(b'c', 4, size_of::<IocTocHeader>());
const CDIOREADTOCENTRYS: c_ulong = iowr(b'c', 5, size_of::<IocReadTocEntry>());

pub struct CdromDevice {
    file: File,
}

impl CdromDevice {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            file: open_device(path)?,
        })
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
        _header: &TocHeader,
        entries: &mut [u32],
        warnings: &mut Vec<DiscError>,
    ) {
        let mut raw = vec![CdTocEntry::default(); entries.len()];
        let mut request = IocReadTocEntry {
            address_format: CD_LBA_FORMAT,
            starting_track: STARTING_TRACK,
            data_len: (raw.len() * size_of::<CdTocEntry>()) as u16,
            data: raw.as_mut_ptr(),
        };
        // raw outlives the call and holds exactly data_len bytes
        if let Err(e) =
            unsafe { ioctl(&self.file, "CDIOREADTOCENTRYS", CDIOREADTOCENTRYS, &mut request) }
        {
            warnings.push(e);
        }
        for (slot, entry) in entries.iter_mut().zip(&raw) {
            debug!("read_entries: track={:#x} lba={}", entry.track, entry.addr);
            *slot = entry.addr;
        }
    }
}
