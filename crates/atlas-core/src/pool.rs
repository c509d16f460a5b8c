//! Fixed-capacity order slab.
//!
//! Pre-allocates storage for every order slot at construction. Uses a LIFO
//! free list so recently vacated slots are reused first, which keeps the hot
//! working set small. Slots are addressed by [`OrderHandle`]; a handle stays
//! valid from `create` until the matching `destroy`.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::mem::MaybeUninit;

use crate::order::Order;

/// Index of a slot in the order pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct OrderHandle(pub u32);

impl OrderHandle {
    /// Invalid handle constant.
    pub const INVALID: Self = Self(u32::MAX);

    /// Check if the handle addresses a slot.
    #[inline(always)]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    /// Get the raw slot index.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for OrderHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Pre-allocated pool of orders.
pub struct OrderPool {
    /// Slot storage.
    slots: Box<[MaybeUninit<Order>]>,
    /// LIFO free list of vacant slot indices.
    free_list: Vec<u32>,
    /// Number of live orders.
    active_count: u32,
}

impl OrderPool {
    /// Create a pool holding up to `capacity` simultaneously live orders.
    ///
    /// # Panics
    /// Panics if `capacity` exceeds what a handle can address.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity < u32::MAX as usize, "pool capacity too large");

        let mut slots: Vec<MaybeUninit<Order>> = Vec::with_capacity(capacity);
        slots.resize_with(capacity, MaybeUninit::uninit);

        // LIFO: lowest indices are handed out first.
        let free_list: Vec<u32> = (0..capacity as u32).rev().collect();

        Self {
            slots: slots.into_boxed_slice(),
            free_list,
            active_count: 0,
        }
    }

    /// Construct `order` in a free slot.
    ///
    /// Returns `None` when the pool is exhausted.
    #[inline(always)]
    pub fn create(&mut self, order: Order) -> Option<OrderHandle> {
        let idx = self.free_list.pop()?;
        self.slots[idx as usize].write(order);
        self.active_count += 1;
        Some(OrderHandle(idx))
    }

    /// Release a slot back to the pool.
    ///
    /// The handle must have been returned by `create` and not yet destroyed.
    #[inline(always)]
    pub fn destroy(&mut self, handle: OrderHandle) {
        debug_assert!(handle.index() < self.slots.len(), "invalid handle");
        debug_assert!(self.active_count > 0, "double destroy");

        self.free_list.push(handle.0);
        self.active_count -= 1;
    }

    /// Get an immutable reference to a live order.
    #[inline(always)]
    pub fn get(&self, handle: OrderHandle) -> &Order {
        debug_assert!(handle.index() < self.slots.len(), "handle out of bounds");
        // SAFETY: handles are only issued by `create`, which initializes the
        // slot, and the caller must not use a handle past `destroy`.
        unsafe { self.slots[handle.index()].assume_init_ref() }
    }

    /// Get a mutable reference to a live order.
    #[inline(always)]
    pub fn get_mut(&mut self, handle: OrderHandle) -> &mut Order {
        debug_assert!(handle.index() < self.slots.len(), "handle out of bounds");
        // SAFETY: same contract as `get`.
        unsafe { self.slots[handle.index()].assume_init_mut() }
    }

    /// Number of free slots.
    #[inline(always)]
    pub fn available(&self) -> usize {
        self.free_list.len()
    }

    /// Number of live orders.
    #[inline(always)]
    pub fn active(&self) -> usize {
        self.active_count as usize
    }

    /// Total slot count.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Check if no free slots remain.
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.free_list.is_empty()
    }
}
