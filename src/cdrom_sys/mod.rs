//! Native CD-ROM table of contents access.
//!
//! Every supported operating system gets its own module exposing a
//! `CdromDevice` that implements [`crate::disc_reader::TocSource`] and a `DEFAULT_DEVICE` path.
//! The ioctl codes and struct layouts are those of the platform headers.

#[cfg(unix)]
use std::{
    fs::{File, OpenOptions},
    io,
    os::unix::{fs::OpenOptionsExt, io::AsRawFd},
    path::Path,
};

#[cfg(unix)]
use log::debug;

#[cfg(unix)]
use crate::disc_reader::{DiscError, Result};

#[cfg(any(target_os = "linux", target_os = "solaris", target_os = "illumos"))]
mod linux;
#[cfg(any(target_os = "linux", target_os = "solaris", target_os = "illumos"))]
pub use linux::{CdromDevice, DEFAULT_DEVICE};

#[cfg(any(target_os = "freebsd", target_os = "dragonfly"))]
mod freebsd;
#[cfg(any(target_os = "freebsd", target_os = "dragonfly"))]
pub use freebsd::{CdromDevice, DEFAULT_DEVICE};

#[cfg(any(target_os = "openbsd", target_os = "netbsd"))]
mod openbsd;
#[cfg(any(target_os = "openbsd", target_os = "netbsd"))]
pub use openbsd::{CdromDevice, DEFAULT_DEVICE};

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
pub use macos::{CdromDevice, DEFAULT_DEVICE};

#[cfg(not(any(
    target_os = "linux",
    target_os = "solaris",
    target_os = "illumos",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "macos",
)))]
mod unsupported;
#[cfg(not(any(
    target_os = "linux",
    target_os = "solaris",
    target_os = "illumos",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "macos",
)))]
pub use unsupported::{CdromDevice, DEFAULT_DEVICE};

/// Open a drive read-only without waiting for media.
#[cfg(unix)]
fn open_device(path: &Path) -> Result<File> {
    debug!("open({})", path.display());
    OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
        .map_err(DiscError::Open)
}

/// Issue `request` on the drive, naming it `name` in errors.
///
/// # Safety
/// `T` must have exactly the layout the driver expects for `request`, and any
/// pointers inside it must be valid for the length the driver is told.
#[cfg(unix)]
unsafe fn ioctl<T>(
    file: &File,
    name: &'static str,
    request: libc::c_ulong,
    arg: &mut T,
) -> Result<()> {
    debug!("ioctl({}, {:#x})", name, request);
    let result = libc::ioctl(file.as_raw_fd(), request as _, arg as *mut T);
    if result < 0 {
        Err(DiscError::Ioctl {
            request: name,
            source: io::Error::last_os_error(),
        })
    } else {
        Ok(())
    }
}

// <sys/ioccom.h> request encoding shared by the BSDs and Darwin
#[cfg(any(
    test,
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "macos",
))]
mod ioccom {
    use libc::c_ulong;

    const IOCPARM_MASK: c_ulong = 0x1fff;
    const IOC_OUT: c_ulong = 0x4000_0000;
    const IOC_IN: c_ulong = 0x8000_0000;
    const IOC_INOUT: c_ulong = IOC_IN | IOC_OUT;

    const fn ioc(inout: c_ulong, group: u8, num: u8, len: usize) -> c_ulong {
        inout | ((len as c_ulong & IOCPARM_MASK) << 16) | ((group as c_ulong) << 8) | num as c_ulong
    }

    /// `_IOR(group, num, T)`
    pub const fn ior(group: u8, num: u8, len: usize) -> c_ulong {
        ioc(IOC_OUT, group, num, len)
    }

    /// `_IOWR(group, num, T)`
    pub const fn iowr(group: u8, num: u8, len: usize) -> c_ulong {
        ioc(IOC_INOUT, group, num, len)
    }

}
