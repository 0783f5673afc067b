use super::ByteSink;
use crate::ring::{Consumer, RingBuffer};

/// Pulls bytes out of a ring in fixed-size chunks and fans each chunk out
/// to every registered sink. The scratch buffer is allocated once; drains
/// themselves do not allocate.
pub struct SinkPump {
    sinks: Vec<Box<dyn ByteSink>>,
    scratch: Vec<u8>,
}

impl Default for SinkPump {
    fn default() -> Self {
        Self::new()
    }
}

impl SinkPump {
    pub const DEFAULT_CHUNK_SIZE: usize = 4096;

    pub fn new() -> Self {
        Self::with_chunk_size(Self::DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        assert!(chunk_size > 0);
        Self {
            sinks: Vec::new(),
            scratch: vec![0; chunk_size],
        }
    }

    pub fn add_sink<S: ByteSink + 'static>(&mut self, sink: S) {
        self.sinks.push(Box::new(sink));
    }

    #[inline]
    pub fn drain(&mut self, ring: &mut RingBuffer) -> DrainStats {
        let mut stats = DrainStats::default();
        loop {
            let n = ring.read(&mut self.scratch);
            if n == 0 {
                break;
            }
            Self::deliver(&mut self.sinks, &self.scratch[..n], &mut stats);
        }
        for sink in &mut self.sinks {
            sink.flush();
        }
        stats
    }

    #[inline]
    pub fn drain_spsc(&mut self, consumer: &mut Consumer<'_>) -> DrainStats {
        let mut stats = DrainStats::default();
        loop {
            let n = consumer.read(&mut self.scratch);
            if n == 0 {
                break;
            }
            Self::deliver(&mut self.sinks, &self.scratch[..n], &mut stats);
        }
        for sink in &mut self.sinks {
            sink.flush();
        }
        stats
    }

    #[inline]
    pub fn drain_batch(&mut self, ring: &mut RingBuffer, max_bytes: usize) -> DrainStats {
        let mut stats = DrainStats::default();
        let mut budget = max_bytes;
        while budget > 0 {
            let want = budget.min(self.scratch.len());
            let n = ring.read(&mut self.scratch[..want]);
            if n == 0 {
                break;
            }
            budget -= n;
            Self::deliver(&mut self.sinks, &self.scratch[..n], &mut stats);
        }
        stats
    }

    #[inline]
    pub fn drain_spsc_batch(&mut self, consumer: &mut Consumer<'_>, max_bytes: usize) -> DrainStats {
        let mut stats = DrainStats::default();
        let mut budget = max_bytes;
        while budget > 0 {
            let want = budget.min(self.scratch.len());
            let n = consumer.read(&mut self.scratch[..want]);
            if n == 0 {
                break;
            }
            budget -= n;
            Self::deliver(&mut self.sinks, &self.scratch[..n], &mut stats);
        }
        stats
    }

    fn deliver(sinks: &mut [Box<dyn ByteSink>], chunk: &[u8], stats: &mut DrainStats) {
        stats.bytes_read += chunk.len() as u64;
        for sink in sinks {
            if sink.consume(chunk) {
                stats.bytes_delivered += chunk.len() as u64;
            } else {
                stats.bytes_failed += chunk.len() as u64;
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DrainStats {
    pub bytes_read: u64,
    pub bytes_delivered: u64,
    pub bytes_failed: u64,
}

impl DrainStats {
    #[inline]
    pub fn delivery_rate(&self) -> f64 {
        let total = self.bytes_delivered + self.bytes_failed;
        if total == 0 {
            1.0
        } else {
            self.bytes_delivered as f64 / total as f64
        }
    }
}
