//! Full-chain benchmarks: the voice on its own and the render engine as the
//! audio callback drives it.

mod engine;
mod voice;

pub use engine::bench_engine;
pub use voice::bench_voice;
