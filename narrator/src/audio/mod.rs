//! Audio assembly module for stitching rendered chunks into one WAV file.

pub mod assembler;

pub use assembler::{AudioSegment, assemble_wav, write_waveform};
