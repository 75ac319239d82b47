//! Benchmarks for low-level DSP primitives.

mod envelope;
mod filter;
mod note;
mod pitch;

pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use note::bench_note;
pub use pitch::bench_pitch;
