/// Frames per second of CD audio.
pub const CD_FRAMES: u32 = 75;

/// MSF offset of the first frame; every reported offset is shifted by this.
pub const PREGAP_FRAMES: u32 = 150;

/// Track number the drivers use to address the lead-out.
pub const CDROM_LEADOUT: u8 = 0xAA;

/// First and last track numbers from the TOC header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TocHeader {
    pub first_track: u8,
    pub last_track: u8,
}

/// Table of contents of an audio disc.
///
/// Holds the raw logical block addresses as reported by the drive, tracks
/// 1..N in order, plus the lead-out. Accessors return offsets shifted by
/// [`PREGAP_FRAMES`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toc {
    track_lbas: Vec<u32>,
    leadout_lba: u32,
}

impl Toc {
    pub fn new(track_lbas: Vec<u32>, leadout_lba: u32) -> Self {
        Self {
            track_lbas,
            leadout_lba,
        }
    }

    /// Build from a table of `last_track + 1` entries whose final slot is the lead-out.
    pub fn from_entries(mut entries: Vec<u32>) -> Option<Self> {
        let leadout_lba = entries.pop()?;
        Some(Self::new(entries, leadout_lba))
    }

    pub fn track_count(&self) -> usize {
        self.track_lbas.len()
    }

    /// Start of each track in frames, pre-gap included, in track order.
    pub fn track_offsets(&self) -> impl Iterator<Item = u32> + '_ {
        self.track_lbas
            .iter()
            .map(|lba| lba.wrapping_add(PREGAP_FRAMES))
    }

    pub fn leadout_offset(&self) -> u32 {
        self.leadout_lba.wrapping_add(PREGAP_FRAMES)
    }

    pub fn leadout_seconds(&self) -> u32 {
        self.leadout_offset() / CD_FRAMES
    }

    /// Playing time from the start of track 1 to the lead-out, in whole seconds.
    pub fn length_seconds(&self) -> u32 {
        let first = self.track_offsets().next().unwrap_or(PREGAP_FRAMES) / CD_FRAMES;
        self.leadout_seconds().saturating_sub(first)
    }

    /// Offsets never decrease and the lead-out lies past the last track.
    pub fn is_consistent(&self) -> bool {
        let ordered = self.track_lbas.windows(2).all(|w| w[0] <= w[1]);
        let last = self.track_lbas.last().copied().unwrap_or(0);
        ordered && self.leadout_lba > last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_shifted_by_pregap() {
        let toc = Toc::new(vec![0, 11625, 31050], 45000);
        assert_eq!(toc.track_offsets().collect::<Vec<_>>(), vec![150, 11775, 31200]);
        assert_eq!(toc.leadout_offset(), 45150);
        assert_eq!(toc.leadout_seconds(), 602);
        assert_eq!(toc.length_seconds(), 600);
        assert_eq!(toc.track_count(), 3);
    }

    #[test]
    fn test_from_entries_splits_leadout() {
        let toc = Toc::from_entries(vec![0, 100, 200]).unwrap();
        assert_eq!(toc, Toc::new(vec![0, 100], 200));
        assert!(Toc::from_entries(vec![]).is_none());
    }

    #[test]
    fn test_consistency() {
        assert!(Toc::new(vec![0, 11625, 31050], 45000).is_consistent());
        // zeroed entry left behind by a failed read
        assert!(!Toc::new(vec![0, 11625, 0], 45000).is_consistent());
        assert!(!Toc::new(vec![0, 11625], 11625).is_consistent());
    }

    #[test]
    fn test_length_does_not_underflow() {
        let toc = Toc::new(vec![9000], 0);
        assert_eq!(toc.length_seconds(), 0);
    }
}
