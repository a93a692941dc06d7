//! `<linux/cdrom.h>` access. Solaris `<sys/cdio.h>` uses the same structures
//! under different request numbers.

use std::{fs::File, path::Path};

use libc::c_ulong;
use log::debug;
use static_assertions::assert_eq_size;

use super::{ioctl, open_device};
use crate::{
    disc_reader::{DiscError, Result, TocSource},
    toc::{TocHeader, CDROM_LEADOUT},
};

#[cfg(target_os = "linux")]
pub const DEFAULT_DEVICE: &str = "/dev/cdrom";
#[cfg(any(target_os = "solaris", target_os = "illumos"))]
pub const DEFAULT_DEVICE: &str = "/dev/vol/aliases/cdrom0";

#[cfg(target_os = "linux")]
const CDROMREADTOCHDR: c_ulong = 0x5305;
#[cfg(target_os = "linux")]
const CDROMREADTOCENTRY: c_ulong = 0x5306;

#[cfg(any(target_os = "solaris", target_os = "illumos"))]
const CDIOC: c_ulong = 0x04 << 8;
#[cfg(any(target_os = "solaris", target_os = "illumos"))]
const CDROMREADTOCHDR: c_ulong = CDIOC | 155;
#[cfg(any(target_os = "solaris", target_os = "illumos"))]
const CDROMREADTOCENTRY: c_ulong = CDIOC | 156;

/// Address format: logical block number, first frame is 0.
const CDROM_LBA: u8 = 0x01;

/// struct cdrom_tochdr
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct CdromTocHdr {
    cdth_trk0: u8,
    cdth_trk1: u8,
}
assert_eq_size!(CdromTocHdr, [u8; 2]);

/// struct cdrom_msf0
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct CdromMsf0 {
    minute: u8,
    second: u8,
    frame: u8,
}

/// union cdrom_addr
#[repr(C)]
#[derive(Clone, Copy)]
union CdromAddr {
    msf: CdromMsf0,
    lba: i32,
}
assert_eq_size!(CdromAddr, [u8; 4]);

/// struct cdrom_tocentry
#[repr(C)]
#[derive(Clone, Copy)]
struct CdromTocEntry {
    cdte_track: u8,
    /// adr:4, ctrl:4
    cdte_adr_ctrl: u8,
    cdte_format: u8,
    cdte_addr: CdromAddr,
    cdte_datamode: u8,
}
assert_eq_size!(CdromTocEntry, [u8; 12]);

impl CdromTocEntry {
    fn request(track: u8) -> Self {
        Self {
            cdte_track: track,
            cdte_adr_ctrl: 0,
            cdte_format: CDROM_LBA,
            cdte_addr: CdromAddr { lba: 0 },
            cdte_datamode: 0,
        }
    }
}

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
        let mut entry = CdromTocEntry::request(track);
        unsafe { ioctl(&self.file, "CDROMREADTOCENTRY", CDROMREADTOCENTRY, &mut entry)? };
        // CDROM_LBA was requested, so the driver filled in the lba arm
        let lba = unsafe { entry.cdte_addr.lba };
        debug!("read_entry: track={:#x} lba={}", track, lba);
        lba_from_raw(track, lba)
    }
}

/// Audio LBAs are never negative; anything below 0 is a bad entry.
fn lba_from_raw(track: u8, lba: i32) -> Result<u32> {
    u32::try_from(lba).map_err(|_| DiscError::BadAddress {
        track,
        lba: lba.into(),
    })
}

impl TocSource for CdromDevice {
    fn read_header(&mut self) -> Result<TocHeader> {
        let mut hdr = CdromTocHdr::default();
        unsafe { ioctl(&self.file, "CDROMREADTOCHDR", CDROMREADTOCHDR, &mut hdr)? };
        Ok(TocHeader {
            first_track: hdr.cdth_trk0,
            last_track: hdr.cdth_trk1,
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
