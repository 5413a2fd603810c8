//! Real-world scenario benchmarks.
//!
//! The engine as a host drives it: every block, with the whole kit playing.

mod engine;

pub use engine::bench_engine;
