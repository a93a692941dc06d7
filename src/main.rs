use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cd_discid::cddb::{format_toc_line, OutputFormat};
use cd_discid::cdrom_sys::{CdromDevice, DEFAULT_DEVICE};
use cd_discid::disc_reader::{read_toc, TocReport};
use cd_discid::Result;
use clap::error::ErrorKind;
use clap::Parser;
use log::{debug, warn};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Output a TOC that is suitable for calculating the MusicBrainz Disc ID
    #[arg(long)]
    musicbrainz: bool,

    /// CD-ROM block device name that contains the CD to be queried
    devicename: Option<PathBuf>,
}

impl Args {
    fn device_path(&self) -> PathBuf {
        self.devicename
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DEVICE))
    }

    fn format(&self) -> OutputFormat {
        if self.musicbrainz {
            OutputFormat::MusicBrainz
        } else {
            OutputFormat::Cddb
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // help, version and usage errors all go to stderr
            eprint!("{}", err);
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };
    debug!("args {:?}", args);

    let command = program_name(std::env::args_os().next());
    let device = args.device_path();
    let report = match read_device(&device) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}: {}: {}", command, device.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let written = print_report(
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
        &command,
        &device,
        &report,
        args.format(),
    );
    match written {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", command, e);
            ExitCode::FAILURE
        }
    }
}

/// argv[0] as shown in diagnostics, even when it is not valid UTF-8.
fn program_name(argv0: Option<OsString>) -> String {
    argv0
        .map(|a| a.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cd-discid".to_string())
}

/// One diagnostic per unreadable entry on `err`, then the TOC line on `out`.
fn print_report<O: Write, E: Write>(
    out: &mut O,
    err: &mut E,
    command: &str,
    device: &Path,
    report: &TocReport,
    format: OutputFormat,
) -> io::Result<()> {
    for warning in &report.warnings {
        writeln!(err, "{}: {}: {}", command, device.display(), warning)?;
    }
    if !report.toc.is_consistent() {
        warn!("TOC of {} is not in track order: {:?}", device.display(), report.toc);
    }
    writeln!(out, "{}", format_toc_line(&report.toc, format))
}

/// Read the TOC; the device is closed again before this returns.
fn read_device(device: &Path) -> Result<TocReport> {
    let mut drive = CdromDevice::open(device)?;
    read_toc(&mut drive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cd_discid::toc::Toc;
    use cd_discid::DiscError;

    #[test]
    fn test_default_device() {
        let args = Args::try_parse_from(["cd-discid"]).unwrap();
        assert_eq!(args.device_path(), PathBuf::from(DEFAULT_DEVICE));
        assert_eq!(args.format(), OutputFormat::Cddb);
    }

    #[test]
    fn test_musicbrainz_with_device() {
        let args = Args::try_parse_from(["cd-discid", "--musicbrainz", "x"]).unwrap();
        assert_eq!(args.device_path(), PathBuf::from("x"));
        assert_eq!(args.format(), OutputFormat::MusicBrainz);
    }

    #[test]
    fn test_two_devices_rejected() {
        assert!(Args::try_parse_from(["cd-discid", "a", "b"]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_program_name_not_utf8() {
        use std::os::unix::ffi::OsStringExt;
        let argv0 = OsString::from_vec(b"/tmp/cd-\xff".to_vec());
        assert_eq!(program_name(Some(argv0)), "/tmp/cd-\u{fffd}");
        assert_eq!(program_name(None), "cd-discid");
    }

    #[test]
    fn test_warning_then_line() {
        let report = TocReport {
            toc: Toc::new(vec![0, 11625, 0], 45000),
            warnings: vec![DiscError::Ioctl {
                request: "CDROMREADTOCENTRY",
                source: io::Error::from(io::ErrorKind::Other),
            }],
        };
        let mut out = Vec::new();
        let mut err = Vec::new();
        print_report(
            &mut out,
            &mut err,
            "cd-discid",
            Path::new("/dev/cdrom"),
            &report,
            OutputFormat::MusicBrainz,
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1 3 45150 150 11775 150\n");
        let err = String::from_utf8(err).unwrap();
        assert_eq!(err.lines().count(), 1);
        assert!(err.starts_with("cd-discid: /dev/cdrom: CDROMREADTOCENTRY: "), "{}", err);
    }
}
