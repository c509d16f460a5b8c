//! Lock-free SPSC ring buffer.
//!
//! Bounded single-producer single-consumer queue with power-of-two capacity.
//! Cursors are cache-line padded to prevent false sharing, and each endpoint
//! keeps a cached copy of the opposite cursor so the common case touches only
//! its own cache line. Publication uses a release store on cursor advance and
//! an acquire load when observing the opposite cursor.
//!
//! The single-producer/single-consumer contract is enforced by the owning
//! [`Producer`] and [`Consumer`] handle types returned by [`channel`].

#![no_std]

extern crate alloc;

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Atomic cursor padded to occupy its own cache line.
#[repr(C, align(128))]
struct PaddedCursor {
    value: AtomicUsize,
}

impl PaddedCursor {
    const fn new(v: usize) -> Self {
        Self {
            value: AtomicUsize::new(v),
        }
    }
}

struct Ring<T> {
    /// Producer cursor: next slot to write.
    head: PaddedCursor,
    /// Producer's cached copy of `tail`.
    cached_tail: PaddedCursor,
    /// Consumer cursor: next slot to read.
    tail: PaddedCursor,
    /// Consumer's cached copy of `head`.
    cached_head: PaddedCursor,
    mask: usize,
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
}

// SAFETY: exactly one producer and one consumer exist, and slot access is
// ordered by the release/acquire cursor protocol.
unsafe impl<T: Send> Send for Ring<T> {}
unsafe impl<T: Send> Sync for Ring<T> {}

impl<T> Drop for Ring<T> {
    fn drop(&mut self) {
        // Both handles are gone; drop whatever was published but never
        // consumed.
        let head = self.head.value.load(Ordering::Relaxed);
        let mut tail = self.tail.value.load(Ordering::Relaxed);
        while tail != head {
            let idx = tail & self.mask;
            // SAFETY: slots in [tail, head) hold initialized values.
            unsafe { (*self.slots[idx].get()).assume_init_drop() };
            tail = tail.wrapping_add(1);
        }
    }
}

/// Create a ring with the given capacity and split it into its two
/// endpoints.
///
/// # Panics
/// Panics unless `capacity` is a power of two and at least 2.
pub fn channel<T: Send>(capacity: usize) -> (Producer<T>, Consumer<T>) {
    assert!(capacity >= 2, "capacity must be at least 2");
    assert!(capacity.is_power_of_two(), "capacity must be a power of two");

    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || UnsafeCell::new(MaybeUninit::uninit()));

    let ring = Arc::new(Ring {
        head: PaddedCursor::new(0),
        cached_tail: PaddedCursor::new(0),
        tail: PaddedCursor::new(0),
        cached_head: PaddedCursor::new(0),
        mask: capacity - 1,
        slots: slots.into_boxed_slice(),
    });

    (
        Producer { ring: ring.clone() },
        Consumer { ring },
    )
}

/// Write endpoint of the ring.
pub struct Producer<T> {
    ring: Arc<Ring<T>>,
}

impl<T: Send> Producer<T> {
    /// Attempt to enqueue a value.
    ///
    /// Returns the value back when the ring is full.
    #[inline(always)]
    pub fn try_push(&mut self, value: T) -> Result<(), T> {
        let ring = &*self.ring;
        let head = ring.head.value.load(Ordering::Relaxed);
        let capacity = ring.mask + 1;

        // Fast path: trust the cached consumer position.
        let mut tail = ring.cached_tail.value.load(Ordering::Relaxed);
        if head.wrapping_sub(tail) >= capacity {
            tail = ring.tail.value.load(Ordering::Acquire);
            ring.cached_tail.value.store(tail, Ordering::Relaxed);
            if head.wrapping_sub(tail) >= capacity {
                return Err(value);
            }
        }

        let idx = head & ring.mask;
        // SAFETY: the slot is outside [tail, head), so the consumer will not
        // touch it until the release store below publishes it.
        unsafe { (*ring.slots[idx].get()).write(value) };

        ring.head.value.store(head.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Enqueue a value, spinning until space is available.
    #[inline]
    pub fn push(&mut self, mut value: T) {
        loop {
            match self.try_push(value) {
                Ok(()) => return,
                Err(rejected) => value = rejected,
            }
            core::hint::spin_loop();
        }
    }

    /// Ring capacity.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.ring.mask + 1
    }
}

/// Read endpoint of the ring.
pub struct Consumer<T> {
    ring: Arc<Ring<T>>,
}

impl<T: Send> Consumer<T> {
    /// Attempt to dequeue a value.
    ///
    /// Returns `None` when the ring is empty.
    #[inline(always)]
    pub fn try_pop(&mut self) -> Option<T> {
        let ring = &*self.ring;
        let tail = ring.tail.value.load(Ordering::Relaxed);

        // Fast path: trust the cached producer position.
        let mut head = ring.cached_head.value.load(Ordering::Relaxed);
        if tail == head {
            head = ring.head.value.load(Ordering::Acquire);
            ring.cached_head.value.store(head, Ordering::Relaxed);
            if tail == head {
                return None;
            }
        }

        let idx = tail & ring.mask;
        // SAFETY: the acquire load above observed the producer's release
        // store, so the slot is initialized and will not be overwritten
        // until the release store below frees it.
        let value = unsafe { (*ring.slots[idx].get()).assume_init_read() };

        ring.tail.value.store(tail.wrapping_add(1), Ordering::Release);
        Some(value)
    }

    /// Dequeue a value, spinning until one is available.
    #[inline]
    pub fn pop(&mut self) -> T {
        loop {
            if let Some(value) = self.try_pop() {
                return value;
            }
            core::hint::spin_loop();
        }
    }

    /// Number of items currently queued.
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.ring.head.value.load(Ordering::Acquire);
        let tail = self.ring.tail.value.load(Ordering::Relaxed);
        head.wrapping_sub(tail)
    }

    /// Check if the ring is currently empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
