use super::RingError;

/// Fixed-capacity byte ring for single-writer/single-reader streaming.
///
/// Capacity is a power of two so index arithmetic reduces to masking with
/// `capacity - 1`. One slot is sacrificed to tell full from empty: the ring
/// holds at most `capacity - 1` bytes, `head == tail` means empty, and
/// `(tail + 1) & mask == head` means full. The `overflow` flag is sticky:
/// a truncating write sets it and only `clear`, `reset`, or a partial
/// `discard` take it back down.
pub struct RingBuffer {
    buf: Vec<u8>,
    capacity: usize,
    pub(crate) head: usize,
    pub(crate) tail: usize,
    overflow: bool,
}

impl RingBuffer {
    pub const MIN_CAPACITY: usize = 2;

    pub fn new(capacity: usize) -> Result<Self, RingError> {
        if !capacity.is_power_of_two() {
            return Err(RingError::InvalidCapacity {
                capacity,
                reason: "must be a power of two",
            });
        }

        if capacity < Self::MIN_CAPACITY {
            return Err(RingError::InvalidCapacity {
                capacity,
                reason: "too small, must be at least 2",
            });
        }

        Ok(Self {
            buf: vec![0; capacity],
            capacity,
            head: 0,
            tail: 0,
            overflow: false,
        })
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    pub fn used(&self) -> usize {
        self.tail.wrapping_sub(self.head) & (self.capacity - 1)
    }

    #[inline(always)]
    pub fn available(&self) -> usize {
        self.capacity - self.used() - 1
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.available() == 0
    }

    #[inline(always)]
    pub fn overflowed(&self) -> bool {
        self.overflow
    }

    /// Rewinds both indices to zero and drops the overflow flag. Storage
    /// content is left as-is; only the indices carry meaning.
    pub fn reset(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.overflow = false;
    }

    /// Copies up to `dst.len()` stored bytes into `dst` and consumes them.
    ///
    /// The request is clamped to `used()`. A wrapped range is copied in two
    /// passes, top of the array first. Returns the number of bytes moved;
    /// the overflow flag is never touched here.
    pub fn read(&mut self, dst: &mut [u8]) -> usize {
        if self.head == self.tail {
            return 0;
        }

        let n = dst.len().min(self.used());
        let head = self.head;

        if head < self.tail {
            dst[..n].copy_from_slice(&self.buf[head..head + n]);
        } else {
            let first = n.min(self.capacity - head);
            dst[..first].copy_from_slice(&self.buf[head..head + first]);
            dst[first..n].copy_from_slice(&self.buf[..n - first]);
        }

        self.head = (head + n) & (self.capacity - 1);
        n
    }

    /// Stores up to `available()` bytes from `src` and returns how many
    /// were taken.
    ///
    /// A full ring returns 0 immediately and leaves the overflow flag
    /// alone. A request larger than the free space is truncated and sets
    /// the flag; a fitting write never changes it. Writing into an empty
    /// ring rewinds both indices to zero first so the bytes land in one
    /// pass.
    pub fn write(&mut self, src: &[u8]) -> usize {
        let free = self.available();
        if free == 0 {
            return 0;
        }

        let n = if src.len() > free {
            self.overflow = true;
            free
        } else {
            src.len()
        };

        if self.head == self.tail {
            self.head = 0;
            self.buf[..n].copy_from_slice(&src[..n]);
            self.tail = n;
            return n;
        }

        let tail = self.tail;

        if self.head < tail {
            let first = n.min(self.capacity - tail);
            self.buf[tail..tail + first].copy_from_slice(&src[..first]);
            self.buf[..n - first].copy_from_slice(&src[first..n]);
        } else {
            // Free space is the single run buf[tail..head); n already fits.
            self.buf[tail..tail + n].copy_from_slice(&src[..n]);
        }

        self.tail = (tail + n) & (self.capacity - 1);
        n
    }

    /// Drops everything in O(1) by aligning head with tail. No zeroing.
    /// Also resets the overflow flag.
    pub fn clear(&mut self) {
        self.head = self.tail;
        self.overflow = false;
    }

    /// Drops up to `count` bytes from the front without copying them out.
    ///
    /// Discarding at least `used()` bytes empties the ring and returns the
    /// prior fill level, leaving the overflow flag as it was. A partial
    /// discard advances head by exactly `count` and resets the flag.
    pub fn discard(&mut self, count: usize) -> usize {
        let used = self.used();

        if count >= used {
            self.head = self.tail;
            return used;
        }

        self.head = (self.head + count) & (self.capacity - 1);
        self.overflow = false;
        count
    }
}
