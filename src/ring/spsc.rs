use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Cross-context variant of the byte ring: same masked-index arithmetic,
/// but `head`, `tail`, and the overflow flag are atomics so the producer
/// side and the consumer side may live on opposite sides of a thread (or
/// interrupt) boundary. Exactly one `Producer` and one `Consumer` exist at
/// a time; `split` pins the ring for their lifetime.
pub struct SpscRing {
    buf: UnsafeCell<Box<[u8]>>,
    capacity: usize,
    mask: usize,
    head: AtomicUsize,
    tail: AtomicUsize,
    overflow: AtomicBool,
}

unsafe impl Send for SpscRing {}
unsafe impl Sync for SpscRing {}

impl SpscRing {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity.is_power_of_two());
        assert!(capacity >= 64);
        Self {
            buf: UnsafeCell::new(vec![0u8; capacity].into_boxed_slice()),
            capacity,
            mask: capacity - 1,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            overflow: AtomicBool::new(false),
        }
    }

    pub fn split(&mut self) -> (Producer<'_>, Consumer<'_>) {
        let ring = &*self;
        (Producer { ring }, Consumer { ring })
    }

    #[inline(always)]
    fn used_from(&self, head: usize, tail: usize) -> usize {
        tail.wrapping_sub(head) & self.mask
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn used(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        self.used_from(head, tail)
    }

    #[inline]
    pub fn available(&self) -> usize {
        self.capacity - self.used() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Relaxed) == self.tail.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn overflowed(&self) -> bool {
        self.overflow.load(Ordering::Relaxed)
    }
}

pub struct Producer<'a> {
    ring: &'a SpscRing,
}

pub struct Consumer<'a> {
    ring: &'a SpscRing,
}

impl Producer<'_> {
    /// Stores up to the free space and returns how many bytes were taken.
    /// Truncation sets the sticky overflow flag; a full ring returns 0 and
    /// leaves it alone.
    #[inline]
    pub fn write(&mut self, src: &[u8]) -> usize {
        let tail = self.ring.tail.load(Ordering::Relaxed);
        let head = self.ring.head.load(Ordering::Acquire);
        let free = self.ring.capacity - self.ring.used_from(head, tail) - 1;

        if free == 0 {
            return 0;
        }

        let n = if src.len() > free {
            self.ring.overflow.store(true, Ordering::Release);
            free
        } else {
            src.len()
        };

        if n == 0 {
            return 0;
        }

        let first = n.min(self.ring.capacity - tail);
        unsafe {
            let buf = &mut *self.ring.buf.get();
            let buf_ptr = buf.as_mut_ptr();
            std::ptr::copy_nonoverlapping(src.as_ptr(), buf_ptr.add(tail), first);
            if n > first {
                std::ptr::copy_nonoverlapping(src.as_ptr().add(first), buf_ptr, n - first);
            }
        }

        self.ring
            .tail
            .store((tail + n) & self.ring.mask, Ordering::Release);
        n
    }

    #[inline]
    pub fn available(&self) -> usize {
        self.ring.available()
    }

    #[inline]
    pub fn overflowed(&self) -> bool {
        self.ring.overflowed()
    }
}

impl Consumer<'_> {
    /// Copies up to `dst.len()` stored bytes into `dst` and consumes them.
    /// Never touches the overflow flag.
    #[inline]
    pub fn read(&mut self, dst: &mut [u8]) -> usize {
        let head = self.ring.head.load(Ordering::Relaxed);
        let tail = self.ring.tail.load(Ordering::Acquire);

        if head == tail {
            return 0;
        }

        let n = dst.len().min(self.ring.used_from(head, tail));
        if n == 0 {
            return 0;
        }

        let first = n.min(self.ring.capacity - head);
        unsafe {
            let buf = &*self.ring.buf.get();
            let buf_ptr = buf.as_ptr();
            std::ptr::copy_nonoverlapping(buf_ptr.add(head), dst.as_mut_ptr(), first);
            if n > first {
                std::ptr::copy_nonoverlapping(buf_ptr, dst.as_mut_ptr().add(first), n - first);
            }
        }

        self.ring
            .head
            .store((head + n) & self.ring.mask, Ordering::Release);
        n
    }

    /// Drops up to `count` bytes from the front. Same flag policy as
    /// `RingBuffer::discard`: emptying leaves the overflow flag as it was,
    /// a partial discard resets it.
    #[inline]
    pub fn discard(&mut self, count: usize) -> usize {
        let head = self.ring.head.load(Ordering::Relaxed);
        let tail = self.ring.tail.load(Ordering::Acquire);
        let used = self.ring.used_from(head, tail);

        if count >= used {
            self.ring.head.store(tail, Ordering::Release);
            return used;
        }

        self.ring.overflow.store(false, Ordering::Release);
        self.ring
            .head
            .store((head + count) & self.ring.mask, Ordering::Release);
        count
    }

    /// Drops everything seen so far and resets the overflow flag.
    #[inline]
    pub fn clear(&mut self) {
        let tail = self.ring.tail.load(Ordering::Acquire);
        self.ring.overflow.store(false, Ordering::Release);
        self.ring.head.store(tail, Ordering::Release);
    }

    #[inline]
    pub fn used(&self) -> usize {
        self.ring.used()
    }

    #[inline]
    pub fn available(&self) -> usize {
        self.ring.available()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    #[inline]
    pub fn overflowed(&self) -> bool {
        self.ring.overflowed()
    }
}
