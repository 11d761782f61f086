pub mod file;
pub mod normalize;

pub use file::AudioFile;
pub use normalize::{normalize, NormalizeConfig};
