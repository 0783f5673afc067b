use super::CaptureHeader;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::ptr;

/// Append-only byte capture backed by a preallocated memory-mapped file.
/// The 64-byte header at the front tracks how far the stream has been
/// written so a capture can be reopened and resumed.
pub struct CaptureWriter {
    _file: File,
    mmap_ptr: *mut u8,
    mmap_len: usize,
    write_offset: usize,
}

impl CaptureWriter {
    pub fn create<P: AsRef<Path>>(path: P, capacity: usize) -> io::Result<Self> {
        let capacity = capacity.max(4096);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        file.set_len(capacity as u64)?;

        let mmap_ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                capacity,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                std::os::unix::io::AsRawFd::as_raw_fd(&file),
                0,
            )
        };

        if mmap_ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        let mut writer = Self {
            _file: file,
            mmap_ptr: mmap_ptr as *mut u8,
            mmap_len: capacity,
            write_offset: CaptureHeader::SIZE,
        };

        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        writer.put_header(&CaptureHeader::new(now));

        Ok(writer)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;

        let metadata = file.metadata()?;
        let capacity = metadata.len() as usize;

        if capacity < CaptureHeader::SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "File too small for header",
            ));
        }

        let mmap_ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                capacity,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                std::os::unix::io::AsRawFd::as_raw_fd(&file),
                0,
            )
        };

        if mmap_ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        let header = unsafe { ptr::read_unaligned(mmap_ptr as *const CaptureHeader) };

        if !header.validate()
            || (header.write_offset as usize) < CaptureHeader::SIZE
            || header.write_offset as usize > capacity
        {
            unsafe {
                libc::munmap(mmap_ptr, capacity);
            }
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Invalid capture header",
            ));
        }

        Ok(Self {
            _file: file,
            mmap_ptr: mmap_ptr as *mut u8,
            mmap_len: capacity,
            write_offset: header.write_offset as usize,
        })
    }

    #[inline]
    pub fn available(&self) -> usize {
        self.mmap_len - self.write_offset
    }

    /// Appends `chunk` if the whole thing fits, updating the header in
    /// place. Returns false when the file is out of room.
    #[inline]
    pub fn write(&mut self, chunk: &[u8]) -> bool {
        if chunk.len() > self.available() {
            return false;
        }

        unsafe {
            ptr::copy_nonoverlapping(
                chunk.as_ptr(),
                self.mmap_ptr.add(self.write_offset),
                chunk.len(),
            );
        }

        self.write_offset += chunk.len();
        self.bump_header(chunk.len() as u64);

        true
    }

    pub fn sync(&self) -> io::Result<()> {
        let result = unsafe {
            libc::msync(
                self.mmap_ptr as *mut libc::c_void,
                self.mmap_len,
                libc::MS_SYNC,
            )
        };

        if result == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    pub fn sync_async(&self) -> io::Result<()> {
        let result = unsafe {
            libc::msync(
                self.mmap_ptr as *mut libc::c_void,
                self.mmap_len,
                libc::MS_ASYNC,
            )
        };

        if result == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    #[inline]
    pub fn write_offset(&self) -> usize {
        self.write_offset
    }

    pub fn header(&self) -> CaptureHeader {
        unsafe { ptr::read_unaligned(self.mmap_ptr as *const CaptureHeader) }
    }

    #[inline]
    fn put_header(&mut self, header: &CaptureHeader) {
        unsafe {
            ptr::write_unaligned(self.mmap_ptr as *mut CaptureHeader, *header);
        }
    }

    #[inline]
    fn bump_header(&mut self, stored: u64) {
        unsafe {
            let header = &mut *(self.mmap_ptr as *mut CaptureHeader);
            header.byte_count += stored;
            header.write_offset = self.write_offset as u64;
        }
    }
}

impl Drop for CaptureWriter {
    fn drop(&mut self) {
        let _ = self.sync();

        unsafe {
            libc::munmap(self.mmap_ptr as *mut libc::c_void, self.mmap_len);
        }
    }
}

unsafe impl Send for CaptureWriter {}
