//! Amateur band table
//!
//! Ordered ascending by frequency. Used to classify the current VFO and to
//! step to a neighbouring band.

/// One named band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    /// Display name, e.g. `40M`
    pub name: &'static str,
    /// Lower edge in Hz
    pub low_hz: u64,
    /// Upper edge in Hz
    pub high_hz: u64,
    /// Frequency to land on when switching to this band
    pub home_hz: u64,
}

impl Band {
    const fn new(name: &'static str, low_hz: u64, high_hz: u64, home_hz: u64) -> Self {
        Self {
            name,
            low_hz,
            high_hz,
            home_hz,
        }
    }

    /// Whether `hz` lies within the band edges
    pub fn contains(&self, hz: u64) -> bool {
        (self.low_hz..=self.high_hz).contains(&hz)
    }

    /// Distance from `hz` to the nearest band edge (0 inside the band)
    fn distance(&self, hz: u64) -> u64 {
        if hz < self.low_hz {
            self.low_hz - hz
        } else {
            hz.saturating_sub(self.high_hz)
        }
    }
}

/// HF + 6m bands, home frequencies on the FT8 watering holes
pub const HF_BANDS: &[Band] = &[
    Band::new("160M", 1_800_000, 2_000_000, 1_840_000),
    Band::new("80M", 3_500_000, 4_000_000, 3_573_000),
    Band::new("40M", 7_000_000, 7_300_000, 7_074_000),
    Band::new("30M", 10_100_000, 10_150_000, 10_136_000),
    Band::new("20M", 14_000_000, 14_350_000, 14_074_000),
    Band::new("17M", 18_068_000, 18_168_000, 18_100_000),
    Band::new("15M", 21_000_000, 21_450_000, 21_074_000),
    Band::new("12M", 24_890_000, 24_990_000, 24_915_000),
    Band::new("10M", 28_000_000, 29_700_000, 28_074_000),
    Band::new("6M", 50_000_000, 54_000_000, 50_313_000),
];

/// Direction of a band step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandStep {
    /// Next entry in the table (higher frequency)
    Next,
    /// Previous entry in the table (lower frequency)
    Previous,
}

/// Read-only, non-empty band table
#[derive(Debug, Clone, Copy)]
pub struct BandTable {
    bands: &'static [Band],
}

impl Default for BandTable {
    fn default() -> Self {
        Self { bands: HF_BANDS }
    }
}

impl BandTable {
    /// Wrap a static table; `None` if it is empty
    pub fn new(bands: &'static [Band]) -> Option<Self> {
        (!bands.is_empty()).then_some(Self { bands })
    }

    /// All bands in table order
    pub fn bands(&self) -> &'static [Band] {
        self.bands
    }

    /// Look a band up by name
    pub fn by_name(&self, name: &str) -> Option<usize> {
        self.bands.iter().position(|b| b.name.eq_ignore_ascii_case(name))
    }

    /// Band at `index`
    pub fn get(&self, index: usize) -> Option<&'static Band> {
        self.bands.get(index)
    }

    /// Index of the band containing `hz`, or the nearest one outside all bands
    pub fn classify(&self, hz: u64) -> usize {
        if let Some(index) = self.bands.iter().position(|b| b.contains(hz)) {
            return index;
        }
        self.bands
            .iter()
            .enumerate()
            .min_by_key(|(_, b)| b.distance(hz))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Neighbouring band index, wrapping at both ends
    pub fn step(&self, index: usize, direction: BandStep) -> usize {
        let len = self.bands.len();
        match direction {
            BandStep::Next => (index + 1) % len,
            BandStep::Previous => (index + len - 1) % len,
        }
    }
}
