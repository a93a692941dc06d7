use std::fmt::{self, Write};

use crate::toc::{Toc, CD_FRAMES};

/// Sum of the decimal digits of `n`: 2344 becomes 2+3+4+4 = 13.
pub fn cddb_sum(mut n: u32) -> u32 {
    let mut ret = 0;
    while n > 0 {
        ret += n % 10;
        n /= 10;
    }
    ret
}

/// Digit sum of every track's start time in seconds.
pub fn cddb_checksum(toc: &Toc) -> u32 {
    toc.track_offsets()
        .map(|offset| cddb_sum(offset / CD_FRAMES))
        .sum()
}

/// CDDB/FreeDB disc id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscId(pub u32);

impl DiscId {
    pub fn from_toc(toc: &Toc) -> Self {
        let checksum = cddb_checksum(toc) % 0xff;
        let tracks = toc.track_count() as u32 & 0xff;
        Self(checksum << 24 | toc.length_seconds() << 8 | tracks)
    }
}

impl fmt::Display for DiscId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `discid tracks offsets... seconds`
    #[default]
    Cddb,
    /// `1 tracks leadout offsets...`, input for the MusicBrainz disc id
    MusicBrainz,
}

/// Render the single output line, without the trailing newline.
pub fn format_toc_line(toc: &Toc, format: OutputFormat) -> String {
    let mut line = match format {
        OutputFormat::Cddb => format!("{} {}", DiscId::from_toc(toc), toc.track_count()),
        OutputFormat::MusicBrainz => {
            format!("1 {} {}", toc.track_count(), toc.leadout_offset())
        }
    };
    for offset in toc.track_offsets() {
        // writing to a String cannot fail
        let _ = write!(line, " {}", offset);
    }
    if format == OutputFormat::Cddb {
        let _ = write!(line, " {}", toc.leadout_seconds());
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_track_toc() -> Toc {
        Toc::new(vec![0, 11625, 31050], 45000)
    }

    #[test]
    fn test_cddb_sum() {
        assert_eq!(cddb_sum(0), 0);
        assert_eq!(cddb_sum(7), 7);
        assert_eq!(cddb_sum(2344), 13);
    }

    #[test]
    fn test_three_track_disc_id() {
        let toc = three_track_toc();
        // 2 + (1+5+7) + (4+1+6)
        assert_eq!(cddb_checksum(&toc), 26);
        assert_eq!(DiscId::from_toc(&toc), DiscId(0x1a02_5803));
        assert_eq!(DiscId::from_toc(&toc).to_string(), "1a025803");
    }

    #[test]
    fn test_cddb_line() {
        assert_eq!(
            format_toc_line(&three_track_toc(), OutputFormat::Cddb),
            "1a025803 3 150 11775 31200 602"
        );
    }

    #[test]
    fn test_musicbrainz_line() {
        assert_eq!(
            format_toc_line(&three_track_toc(), OutputFormat::MusicBrainz),
            "1 3 45150 150 11775 31200"
        );
    }

    #[test]
    fn test_known_freedb_id() {
        let offsets = [
            150, 18901, 39738, 59557, 79152, 100126, 124833, 147278, 166336, 182560,
        ];
        let lbas = offsets.iter().map(|o| o - 150).collect();
        let toc = Toc::new(lbas, 206535 - 150);
        assert_eq!(DiscId::from_toc(&toc).to_string(), "830abf0a");
        assert_eq!(
            format_toc_line(&toc, OutputFormat::MusicBrainz),
            "1 10 206535 150 18901 39738 59557 79152 100126 124833 147278 166336 182560"
        );
    }

    #[test]
    fn test_checksum_wraps_mod_255() {
        // 99 tracks starting at second 3599 sum to 99 * (3+5+9+9) = 2574
        let toc = Toc::new(vec![3599 * 75 - 150; 99], 3700 * 75);
        assert_eq!(cddb_checksum(&toc), 2574);
        assert_eq!(DiscId::from_toc(&toc).0 >> 24, 2574 % 255);
        assert_eq!(DiscId::from_toc(&toc).0 & 0xff, 99);
    }
}
