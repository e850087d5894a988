pub mod replay;
pub mod synthetic;

pub use replay::ReplaySource;
pub use synthetic::SyntheticSource;
