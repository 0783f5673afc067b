pub mod pump;

pub use pump::{DrainStats, SinkPump};

pub trait ByteSink: Send {
    fn consume(&mut self, chunk: &[u8]) -> bool;

    fn flush(&mut self) {}

    fn name(&self) -> &str;
}
