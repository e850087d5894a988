use crate::Reading;

/// Lowest frequency the scanner reports, in MHz. Line offsets are
/// relative to this base.
pub const BAND_BASE_MHZ: u32 = 2400;
/// Exclusive upper edge of the scanned band, in MHz.
pub const BAND_LIMIT_MHZ: u32 = 2500;
/// Hardware maximum signal magnitude the radio module can report.
pub const MAX_STRENGTH: u32 = 32;

/// Why a raw line was discarded instead of producing a [`Reading`].
///
/// Skips are normal operation in the presence of line noise; the caller
/// logs the reason and moves on to the next line. A skipped line is
/// never retried or buffered.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    #[error("fewer than two values on the line")]
    MissingToken,
    #[error("token is not a valid unsigned integer")]
    BadNumber,
    #[error("channel {0} MHz is outside the scanned band")]
    ChannelOutOfBand(u32),
    #[error("strength {0} exceeds the hardware maximum of {MAX_STRENGTH}")]
    StrengthTooHigh(u32),
}

/// Validates one raw line from the transport.
///
/// Anything that is not an ASCII digit or whitespace is stripped first;
/// the scanner firmware occasionally interleaves control bytes with real
/// output. The first surviving token is the MHz offset above
/// [`BAND_BASE_MHZ`], the second is the signal strength.
pub fn parse(raw: &str) -> Result<Reading, Skip> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || c.is_whitespace())
        .collect();
    let mut tokens = cleaned.split_whitespace();
    let offset = tokens.next().ok_or(Skip::MissingToken)?;
    let strength = tokens.next().ok_or(Skip::MissingToken)?;

    // Tokens are pure digit runs at this point, so the only parse
    // failure left is integer overflow.
    let offset: u32 = offset.parse().map_err(|_| Skip::BadNumber)?;
    let strength: u32 = strength.parse().map_err(|_| Skip::BadNumber)?;

    if offset >= BAND_LIMIT_MHZ - BAND_BASE_MHZ {
        return Err(Skip::ChannelOutOfBand(offset.saturating_add(BAND_BASE_MHZ)));
    }
    if strength > MAX_STRENGTH {
        return Err(Skip::StrengthTooHigh(strength));
    }

    Ok(Reading {
        channel_mhz: BAND_BASE_MHZ + offset,
        strength: f64::from(strength),
    })
}
