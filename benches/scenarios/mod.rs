//! Benchmarks for realistic voice and kit usage.

mod mix;
mod voices;

pub use mix::bench_mix;
pub use voices::bench_voices;
