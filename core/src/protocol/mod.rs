pub mod line;

pub use line::{parse, Skip, BAND_BASE_MHZ, BAND_LIMIT_MHZ, MAX_STRENGTH};
