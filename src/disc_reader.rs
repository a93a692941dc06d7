use std::io;

use log::debug;
use thiserror::Error;

use crate::toc::{Toc, TocHeader};

#[derive(Error, Debug)]
pub enum DiscError {
    #[error("open: {0}")]
    Open(#[source] io::Error),
    #[error("{request}: {source}")]
    Ioctl {
        request: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("track {track:#x}: invalid address {lba}")]
    BadAddress { track: u8, lba: i64 },
    #[error("Can't allocate memory for TOC entries")]
    Alloc,
    #[error("disc has no tracks")]
    NoTracks,
    #[error("reading a CD-ROM is not supported on this platform")]
    Unsupported,
}

pub type Result<T> = std::result::Result<T, DiscError>;

/// A drive that can report its table of contents.
///
/// One implementation exists per operating system, see [`crate::cdrom_sys`].
pub trait TocSource {
    /// Read the first and last track numbers. Failure here is fatal.
    fn read_header(&mut self) -> Result<TocHeader>;

    /// Fill `entries` with the LBA of tracks `1..=header.last_track`, followed
    /// by the lead-out in the final slot.
    ///
    /// `entries` arrives zeroed and holds `last_track + 1` slots. A slot that
    /// cannot be read is left as it is and the error is pushed to `warnings`.
    fn read_entries(
        &mut self,
        header: &TocHeader,
        entries: &mut [u32],
        warnings: &mut Vec<DiscError>,
    );
}

/// The TOC plus every non-fatal failure met while reading it.
#[derive(Debug)]
pub struct TocReport {
    pub toc: Toc,
    pub warnings: Vec<DiscError>,
}

/// Query a drive for its full table of contents.
pub fn read_toc<S: TocSource>(source: &mut S) -> Result<TocReport> {
    let header = source.read_header()?;
    debug!("read_toc: header={:?}", header);
    if header.last_track == 0 {
        return Err(DiscError::NoTracks);
    }
    let len = header.last_track as usize + 1;
    let mut entries: Vec<u32> = Vec::new();
    entries
        .try_reserve_exact(len)
        .map_err(|_| DiscError::Alloc)?;
    entries.resize(len, 0);

    let mut warnings = Vec::new();
    source.read_entries(&header, &mut entries, &mut warnings);
    for warning in &warnings {
        debug!("read_toc: warning {}", warning);
    }
    debug!("read_toc: entries={:?}", entries);

    let toc = Toc::from_entries(entries).ok_or(DiscError::NoTracks)?;
    Ok(TocReport { toc, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    /// In-memory drive; tracks listed in `failing` report an I/O error.
    struct FakeDrive {
        header: Option<TocHeader>,
        lbas: Vec<u32>,
        failing: BTreeSet<usize>,
        entries_read: bool,
    }

    impl FakeDrive {
        fn new(lbas: Vec<u32>) -> Self {
            let last_track = (lbas.len() - 1) as u8;
            Self {
                header: Some(TocHeader {
                    first_track: 1,
                    last_track,
                }),
                lbas,
                failing: BTreeSet::new(),
                entries_read: false,
            }
        }
    }

    impl TocSource for FakeDrive {
        fn read_header(&mut self) -> Result<TocHeader> {
            self.header.ok_or_else(|| DiscError::Ioctl {
                request: "CDROMREADTOCHDR",
                source: io::Error::from_raw_os_error(libc::ENXIO),
            })
        }

        fn read_entries(
            &mut self,
            _header: &TocHeader,
            entries: &mut [u32],
            warnings: &mut Vec<DiscError>,
        ) {
            self.entries_read = true;
            for (i, slot) in entries.iter_mut().enumerate() {
                if self.failing.contains(&i) {
                    warnings.push(DiscError::Ioctl {
                        request: "CDROMREADTOCENTRY",
                        source: io::Error::from_raw_os_error(libc::EIO),
                    });
                } else {
                    *slot = self.lbas[i];
                }
            }
        }
    }

    #[test]
    fn test_read_toc() {
        let _ = env_logger::try_init();
        let mut drive = FakeDrive::new(vec![0, 11625, 31050, 45000]);
        let report = read_toc(&mut drive).unwrap();
        assert!(report.warnings.is_empty());
        assert_eq!(report.toc, Toc::new(vec![0, 11625, 31050], 45000));
    }

    #[test]
    fn test_header_failure_is_fatal() {
        let mut drive = FakeDrive::new(vec![0, 45000]);
        drive.header = None;
        let err = read_toc(&mut drive).unwrap_err();
        assert!(matches!(
            err,
            DiscError::Ioctl {
                request: "CDROMREADTOCHDR",
                ..
            }
        ));
        assert!(!drive.entries_read);
    }

    #[test]
    fn test_entry_failure_leaves_zero() {
        let _ = env_logger::try_init();
        let mut drive = FakeDrive::new(vec![0, 11625, 31050, 45000]);
        drive.failing.insert(2);
        let report = read_toc(&mut drive).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(
            report.warnings[0].to_string(),
            format!("CDROMREADTOCENTRY: {}", io::Error::from_raw_os_error(libc::EIO))
        );
        assert_eq!(report.toc, Toc::new(vec![0, 11625, 0], 45000));
        assert!(!report.toc.is_consistent());
    }

    #[test]
    fn test_one_warning_per_failed_entry() {
        let _ = env_logger::try_init();
        let mut drive = FakeDrive::new(vec![0, 11625, 31050, 45000]);
        drive.failing.insert(0);
        drive.failing.insert(3);
        let report = read_toc(&mut drive).unwrap();
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.toc, Toc::new(vec![0, 11625, 31050], 0));
    }

    #[test]
    fn test_empty_disc_is_rejected() {
        let mut drive = FakeDrive::new(vec![0]);
        assert!(matches!(read_toc(&mut drive), Err(DiscError::NoTracks)));
    }
}
