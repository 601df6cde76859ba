//! Deterministic pseudo-random waveform peaks for display
//!
//! Notes carry no precomputed waveform, so list/play views render a stable
//! amplitude strip derived from the note id. Presentation only.

/// Seeded generator: FNV-1a over the seed, then a mulberry32-style stream.
pub struct SeededPeaks {
    state: u32,
}

impl SeededPeaks {
    pub fn new(seed: &str) -> Self {
        let mut h: u32 = 2_166_136_261;
        for b in seed.bytes() {
            h = (h ^ u32::from(b)).wrapping_mul(16_777_619);
        }
        Self { state: h }
    }

    /// Next value in [0.0, 1.0).
    fn next(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x6d2b_79f5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(1 | self.state);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t));
        f64::from(t ^ (t >> 14)) / 4_294_967_296.0
    }
}

/// Generate `bars` display amplitudes in [0.05, 1.0) for the given seed.
pub fn generate_peaks(seed: &str, bars: usize) -> Vec<f64> {
    let mut rng = SeededPeaks::new(seed);
    (0..bars).map(|_| 0.05 + rng.next() * 0.95).collect()
}

/// Render peaks as a unicode bar strip for terminal display.
pub fn render_bars(peaks: &[f64]) -> String {
    const GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    peaks
        .iter()
        .map(|p| {
            let idx = (p.clamp(0.0, 1.0) * 7.0).round() as usize;
            GLYPHS[idx.min(7)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peaks_are_deterministic_per_seed() {
        let a = generate_peaks("note-1700000000000", 40);
        let b = generate_peaks("note-1700000000000", 40);
        let c = generate_peaks("note-1700000000001", 40);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 40);
    }

    #[test]
    fn peaks_stay_in_display_range() {
        for p in generate_peaks("any", 200) {
            assert!((0.05..1.0).contains(&p), "peak out of range: {}", p);
        }
    }

    #[test]
    fn bars_render_one_glyph_per_peak() {
        let strip = render_bars(&generate_peaks("x", 16));
        assert_eq!(strip.chars().count(), 16);
    }
}
