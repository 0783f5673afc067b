use bytering::capture::CaptureWriter;
use bytering::ring::SpscRing;
use bytering::sink::{ByteSink, SinkPump};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

struct CaptureSink {
    writer: CaptureWriter,
    bytes_written: u64,
}

impl CaptureSink {
    fn new(path: &str, capacity: usize) -> std::io::Result<Self> {
        Ok(Self {
            writer: CaptureWriter::create(path, capacity)?,
            bytes_written: 0,
        })
    }
}

impl ByteSink for CaptureSink {
    fn consume(&mut self, chunk: &[u8]) -> bool {
        let ok = self.writer.write(chunk);
        if ok {
            self.bytes_written += chunk.len() as u64;
        }
        ok
    }

    fn flush(&mut self) {
        let _ = self.writer.sync_async();
    }

    fn name(&self) -> &str {
        "capture"
    }
}

fn main() {
    println!("bytering v0.1.0");
    println!("Press Ctrl+C to stop\n");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        println!("\nShutting down...");
        r.store(false, Ordering::SeqCst);
    })
    .expect("Failed to set Ctrl+C handler");

    let mut ring = SpscRing::new(64 * 1024);
    let (mut producer, mut consumer) = ring.split();

    let mut pump = SinkPump::new();
    let capture_sink = CaptureSink::new("/tmp/bytering.cap", 64 * 1024 * 1024).unwrap();
    pump.add_sink(capture_sink);

    println!("Service running. Streaming bytes...");

    let total_bytes = std::thread::scope(|scope| {
        let feeder_running = running.clone();
        scope.spawn(move || {
            let mut pattern = [0u8; 256];
            for (i, byte) in pattern.iter_mut().enumerate() {
                *byte = i as u8;
            }

            while feeder_running.load(Ordering::Relaxed) {
                producer.write(&pattern);
                std::thread::sleep(Duration::from_millis(1));
            }
        });

        let mut total_bytes = 0u64;
        let mut last_report = Instant::now();

        while running.load(Ordering::SeqCst) {
            let stats = pump.drain_spsc(&mut consumer);
            total_bytes += stats.bytes_read;

            if last_report.elapsed() >= Duration::from_secs(5) {
                println!(
                    "[STATUS] total_bytes={} ring_used={} ring_available={} overflow={}",
                    total_bytes,
                    consumer.used(),
                    consumer.available(),
                    consumer.overflowed()
                );
                last_report = Instant::now();
            }

            std::thread::sleep(Duration::from_millis(10));
        }

        total_bytes
    });

    println!("Total bytes captured: {}", total_bytes);
    std::fs::remove_file("/tmp/bytering.cap").ok();
}
