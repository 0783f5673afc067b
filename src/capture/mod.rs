pub mod header;
pub mod reader;
pub mod writer;

pub use header::CaptureHeader;
pub use reader::CaptureReader;
pub use writer::CaptureWriter;
