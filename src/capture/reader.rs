use super::CaptureHeader;
use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::ptr;

pub struct CaptureReader {
    _file: File,
    mmap_ptr: *const u8,
    mmap_len: usize,
    header: CaptureHeader,
}

impl CaptureReader {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        let metadata = file.metadata()?;
        let len = metadata.len() as usize;

        if len < CaptureHeader::SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "File too small for header",
            ));
        }

        let mmap_ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                0,
            )
        };

        if mmap_ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        let header = unsafe { ptr::read_unaligned(mmap_ptr as *const CaptureHeader) };

        if !header.validate()
            || (header.write_offset as usize) < CaptureHeader::SIZE
            || header.write_offset as usize > len
        {
            unsafe {
                libc::munmap(mmap_ptr, len);
            }
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Invalid capture header",
            ));
        }

        Ok(Self {
            _file: file,
            mmap_ptr: mmap_ptr as *const u8,
            mmap_len: len,
            header,
        })
    }

    #[inline]
    pub fn byte_count(&self) -> u64 {
        self.header.byte_count
    }

    #[inline]
    pub fn created_at(&self) -> i64 {
        self.header.created_at
    }

    /// The captured byte stream, in write order.
    #[inline]
    pub fn data(&self) -> &[u8] {
        let end = self.header.write_offset as usize;
        unsafe {
            std::slice::from_raw_parts(
                self.mmap_ptr.add(CaptureHeader::SIZE),
                end - CaptureHeader::SIZE,
            )
        }
    }

    pub fn advise_sequential(&self) {
        unsafe {
            libc::madvise(
                self.mmap_ptr as *mut libc::c_void,
                self.mmap_len,
                libc::MADV_SEQUENTIAL,
            );
        }
    }

    pub fn advise_willneed(&self) {
        unsafe {
            libc::madvise(
                self.mmap_ptr as *mut libc::c_void,
                self.mmap_len,
                libc::MADV_WILLNEED,
            );
        }
    }
}

impl Drop for CaptureReader {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.mmap_ptr as *mut libc::c_void, self.mmap_len);
        }
    }
}

unsafe impl Send for CaptureReader {}
unsafe impl Sync for CaptureReader {}
