use bytering::capture::CaptureWriter;
use bytering::ring::SpscRing;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("SPSC bytering stress test + mmap capture\n");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|e| format!("Failed to set Ctrl+C handler: {}", e))?;

    let mut ring = SpscRing::new(64 * 1024 * 1024);
    let (mut prod, mut cons) = ring.split();

    std::thread::scope(|scope| {
        let writer_running = running.clone();
        let writer = scope.spawn(move || {
            let payload = [0xA5u8; 64];
            let mut written = 0u64;
            let mut truncated = 0u64;

            while writer_running.load(Ordering::Relaxed) {
                let n = prod.write(&payload);
                written += n as u64;
                if n < payload.len() {
                    truncated += 1;
                }
            }

            (written, truncated)
        });

        let reader_running = running.clone();
        let reader = scope.spawn(move || -> Result<u64, std::io::Error> {
            let mut capture = CaptureWriter::create("/tmp/bytering_stress.cap", 1024 * 1024 * 1024)?;
            let mut chunk = [0u8; 4096];
            let mut total = 0u64;

            loop {
                loop {
                    let n = cons.read(&mut chunk);
                    if n == 0 {
                        break;
                    }
                    capture.write(&chunk[..n]);
                    total += n as u64;
                }

                if !reader_running.load(Ordering::Relaxed) && cons.is_empty() {
                    break;
                }
            }

            capture.sync()?;
            Ok(total)
        });

        println!("Running for 5 seconds...");
        std::thread::sleep(Duration::from_secs(5));
        running.store(false, Ordering::SeqCst);

        let (written, truncated) = writer.join().unwrap();
        let read = reader.join().unwrap()?;

        let file_size = std::fs::metadata("/tmp/bytering_stress.cap")
            .map(|m| m.len())
            .unwrap_or(0);

        println!("\nResults:");
        println!("  Written to ring: {} bytes", written);
        println!("  Persisted to disk: {} bytes", read);
        println!("  Truncated writes: {}", truncated);
        println!(
            "  Throughput: {:.2} MB/sec",
            written as f64 / 5.0 / 1024.0 / 1024.0
        );
        println!("  File size: {:.2} MB", file_size as f64 / 1024.0 / 1024.0);

        Ok(())
    })
}
