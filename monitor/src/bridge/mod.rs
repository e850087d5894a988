pub mod bridge;
pub mod model;

pub use bridge::SpectrumBridge;
pub use model::{ChannelReport, SpectrumModel};
