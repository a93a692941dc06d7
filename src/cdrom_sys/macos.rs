//! Darwin `<IOKit/storage/IOCDMediaBSDClient.h>` access.
//!
//! `CDDiscInfo` and `CDTrackInfo` are packed big-endian MMC replies, so they
//! are read as byte buffers. The lead-out is not reported reliably and is
//! computed from the start and size of the last track instead.

use std::{ffi::c_void, fs::File, io, mem::size_of, path::Path};

use libc::c_ulong;
use log::debug;
use static_assertions::assert_eq_size;

use super::{ioccom::iowr, ioctl, open_device};
use crate::{
    disc_reader::{DiscError, Result, TocSource},
    toc::TocHeader,
};

pub const DEFAULT_DEVICE: &str = "/dev/rdisk1";

const K_CD_TRACK_INFO_ADDRESS_TYPE_TRACK_NUMBER: u8 = 0x01;

const CD_DISC_INFO_LEN: usize = 34;
const DISC_INFO_NUMBER_OF_FIRST_TRACK: usize = 3;
const DISC_INFO_LAST_TRACK_IN_LAST_SESSION_LSB: usize = 6;

const CD_TRACK_INFO_LEN: usize = 36;
const TRACK_INFO_TRACK_START_ADDRESS: usize = 8;
const TRACK_INFO_TRACK_SIZE: usize = 24;

/// dk_cd_read_disc_info_t
#[repr(C)]
struct DkCdReadDiscInfo {
    reserved0000: [u8; 10],
    buffer_length: u16,
    buffer: *mut c_void,
}
#[cfg(target_pointer_width = "64")]
assert_eq_size!(DkCdReadDiscInfo, [u8; 24]);

/// dk_cd_read_track_info_t
#[repr(C)]
struct DkCdReadTrackInfo {
    reserved0000: [u8; 4],
    address: u32,
    address_type: u8,
    reserved0009: [u8; 1],
    buffer_length: u16,
    buffer: *mut c_void,
}
#[cfg(target_pointer_width = "64")]
assert_eq_size!(DkCdReadTrackInfo, [u8; 24]);

const DKIOCCDREADDISCINFO: c_ulong = iowr(b'd', 96, size_of::<DkCdReadDiscInfo>());
const DKIOCCDREADTRACKINFO: c_ulong = iowr(b'd', 97, size_of::<DkCdReadTrackInfo>());

fn be_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
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

    /// Returns (start, size) of a track, both in frames.
    fn read_track_info(&mut self, track: u8) -> Result<(u32, u32)> {
        let mut info = [0u8; CD_TRACK_INFO_LEN];
        let mut params = DkCdReadTrackInfo {
            reserved0000: [0; 4],
            address: track as u32,
            address_type: K_CD_TRACK_INFO_ADDRESS_TYPE_TRACK_NUMBER,
            reserved0009: [0; 1],
            buffer_length: info.len() as u16,
            buffer: info.as_mut_ptr() as *mut c_void,
        };
        unsafe { ioctl(&self.file, "DKIOCCDREADTRACKINFO", DKIOCCDREADTRACKINFO, &mut params)? };
        let start = be_u32(&info, TRACK_INFO_TRACK_START_ADDRESS);
        let size = be_u32(&info, TRACK_INFO_TRACK_SIZE);
        debug!("read_track_info: track={} start={} size={}", track, start, size);
        Ok((start, size))
    }
}

impl TocSource for CdromDevice {
    fn read_header(&mut self) -> Result<TocHeader> {
        let mut info = [0u8; CD_DISC_INFO_LEN];
        let mut params = DkCdReadDiscInfo {
            reserved0000: [0; 10],
            buffer_length: info.len() as u16,
            buffer: info.as_mut_ptr() as *mut c_void,
        };
        unsafe { ioctl(&self.file, "DKIOCCDREADDISCINFO", DKIOCCDREADDISCINFO, &mut params)? };
        if (params.buffer_length as usize) <= DISC_INFO_LAST_TRACK_IN_LAST_SESSION_LSB {
            return Err(DiscError::Ioctl {
                request: "DKIOCCDREADDISCINFO",
                source: io::Error::new(io::ErrorKind::InvalidData, "short disc info reply"),
            });
        }
        Ok(TocHeader {
            first_track: info[DISC_INFO_NUMBER_OF_FIRST_TRACK],
            last_track: info[DISC_INFO_LAST_TRACK_IN_LAST_SESSION_LSB],
        })
    }

    fn read_entries(
        &mut self,
        header: &TocHeader,
        entries: &mut [u32],
        warnings: &mut Vec<DiscError>,
    ) {
        let last = header.last_track as usize;
        let mut last_size = 0;
        for (i, slot) in entries[..last].iter_mut().enumerate() {
            match self.read_track_info(i as u8 + 1) {
                Ok((start, size)) => {
                    *slot = start;
                    last_size = size;
                }
                Err(e) => {
                    last_size = 0;
                    warnings.push(e);
                }
            }
        }
        entries[last] = entries[last - 1].wrapping_add(last_size);
    }
}
