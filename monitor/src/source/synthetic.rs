use rand::{rngs::StdRng, Rng, SeedableRng};
use scancore::protocol::{BAND_BASE_MHZ, BAND_LIMIT_MHZ, MAX_STRENGTH};
use scancore::{IngestError, IngestResult, LineSource};

const BAND_WIDTH: u32 = BAND_LIMIT_MHZ - BAND_BASE_MHZ;

/// Deterministic stand-in for the scanner hardware.
///
/// Sweeps the band one channel per line with seeded random strengths and
/// mixes in a configurable share of noise lines, so a full session also
/// exercises the skip path.
pub struct SyntheticSource {
    rng: StdRng,
    remaining: usize,
    offset: u32,
    noise_ratio: f64,
}

impl SyntheticSource {
    pub fn new(lines: usize, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            remaining: lines,
            offset: 0,
            noise_ratio: 0.05,
        }
    }

    pub fn with_noise_ratio(mut self, noise_ratio: f64) -> Self {
        self.noise_ratio = noise_ratio.clamp(0.0, 1.0);
        self
    }

    fn noise_line(&mut self, offset: u32) -> String {
        if self.rng.gen_bool(0.5) {
            // Status chatter; strips down to nothing.
            "## scanner ready ##\r\n".to_string()
        } else {
            // Spike above the hardware maximum.
            format!("{} {}\r\n", offset, MAX_STRENGTH + self.rng.gen_range(1..64))
        }
    }
}

impl LineSource for SyntheticSource {
    fn next_line(&mut self) -> IngestResult<String> {
        if self.remaining == 0 {
            return Err(IngestError::EndOfStream);
        }
        self.remaining -= 1;

        let offset = self.offset;
        self.offset = (self.offset + 1) % BAND_WIDTH;

        if self.rng.gen_bool(self.noise_ratio) {
            return Ok(self.noise_line(offset));
        }
        let strength: u32 = self.rng.gen_range(0..=MAX_STRENGTH);
        Ok(format!("{} {}\r\n", offset, strength))
    }
}
