pub mod file;
pub mod pcm;
pub mod source;

pub use file::AudioFile;
pub use source::{AudioFrame, AudioSource, AudioSourceConfig, FileSource};
