//! Price level queue management.
//!
//! A price level aggregates all orders resting at one price: a running total
//! quantity and a FIFO enforcing time priority within the level.

use crate::pool::{OrderHandle, OrderPool};
use crate::queue::OrderQueue;
use crate::types::{Price, Quantity};

/// A single price level in the book.
#[derive(Clone, Copy, Debug)]
pub struct PriceLevel {
    price: Price,
    total_quantity: Quantity,
    orders: OrderQueue,
}

impl PriceLevel {
    /// Create an empty level at `price`.
    pub const fn new(price: Price) -> Self {
        Self {
            price,
            total_quantity: 0,
            orders: OrderQueue::new(),
        }
    }

    /// Price represented by this level.
    #[inline(always)]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Aggregate resting quantity at this price.
    #[inline(always)]
    pub const fn total(&self) -> Quantity {
        self.total_quantity
    }

    /// Check if no orders rest at this level.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Append an order at the tail of the FIFO and update the aggregate.
    pub fn add(&mut self, pool: &mut OrderPool, handle: OrderHandle) {
        let qty = {
            let order = pool.get_mut(handle);
            order.resting = true;
            order.quantity
        };
        self.total_quantity += qty;
        self.orders.push_back(pool, handle);
    }

    /// Handle of the oldest resting order, or `None` when empty.
    #[inline(always)]
    pub fn top(&self) -> Option<OrderHandle> {
        self.orders.front()
    }

    /// Unlink an order from the FIFO and update the aggregate.
    pub fn remove(&mut self, pool: &mut OrderPool, handle: OrderHandle) {
        let qty = {
            let order = pool.get_mut(handle);
            order.resting = false;
            order.quantity
        };
        self.total_quantity = (self.total_quantity - qty).max(0);
        self.orders.erase(pool, handle);
    }

    /// Apply a fill delta to the aggregate.
    ///
    /// Invoked after the match loop has already decremented the resting
    /// order's own quantity.
    #[inline(always)]
    pub fn on_fill(&mut self, delta: Quantity) {
        self.total_quantity = (self.total_quantity - delta).max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Order;
    use crate::types::{Side, TimeInForce};

    fn resting(pool: &mut OrderPool, id: u64, qty: Quantity) -> OrderHandle {
        pool.create(Order::new(id, 100, qty, Side::Sell, TimeInForce::GFD, None))
            .unwrap()
    }

    #[test]
    fn test_add_tracks_aggregate_and_resting() {
        let mut pool = OrderPool::new(8);
        let mut level = PriceLevel::new(100);

        let a = resting(&mut pool, 1, 5);
        let b = resting(&mut pool, 2, 7);
        level.add(&mut pool, a);
        level.add(&mut pool, b);

        assert_eq!(level.total(), 12);
        assert!(pool.get(a).resting);
        assert_eq!(level.top(), Some(a));
    }

    #[test]
    fn test_remove_clears_resting() {
        let mut pool = OrderPool::new(8);
        let mut level = PriceLevel::new(100);

        let a = resting(&mut pool, 1, 5);
        let b = resting(&mut pool, 2, 3);
        level.add(&mut pool, a);
        level.add(&mut pool, b);

        level.remove(&mut pool, a);
        assert_eq!(level.total(), 3);
        assert!(!pool.get(a).resting);
        assert_eq!(level.top(), Some(b));
    }

    #[test]
    fn test_on_fill_clamps_at_zero() {
        let mut pool = OrderPool::new(8);
        let mut level = PriceLevel::new(100);

        let a = resting(&mut pool, 1, 5);
        level.add(&mut pool, a);

        level.on_fill(3);
        assert_eq!(level.total(), 2);

        level.on_fill(10);
        assert_eq!(level.total(), 0);
    }
}
