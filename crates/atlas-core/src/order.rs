//! Order representation.
//!
//! Orders are allocated from [`crate::pool::OrderPool`] and never move in
//! memory until released, so the rest of the book can address them by
//! handle. Each order embeds its own FIFO links, letting price levels queue
//! orders without any per-insertion allocation.

use crate::pool::OrderHandle;
use crate::types::{OrderId, Price, Quantity, Side, TimeInForce};

/// A single client order.
#[derive(Clone, Copy, Debug)]
pub struct Order {
    /// Internal numeric identifier (assigned by the caller).
    pub id: OrderId,
    /// Limit price in ticks.
    pub price: Price,
    /// Remaining quantity.
    pub quantity: Quantity,
    /// Buy or sell intent.
    pub side: Side,
    /// Time-in-force semantics.
    pub tif: TimeInForce,
    /// Minimum acceptable fill quantity, checked at admission.
    pub min_qty: Option<Quantity>,
    /// True iff the order currently occupies a price-level FIFO.
    pub resting: bool,
    /// Next order in the owning level's FIFO.
    pub(crate) next: OrderHandle,
    /// Previous order in the owning level's FIFO.
    pub(crate) prev: OrderHandle,
}

impl Order {
    /// Create a new order with unlinked FIFO hooks.
    #[inline(always)]
    pub fn new(
        id: OrderId,
        price: Price,
        quantity: Quantity,
        side: Side,
        tif: TimeInForce,
        min_qty: Option<Quantity>,
    ) -> Self {
        Self {
            id,
            price,
            quantity,
            side,
            tif,
            min_qty,
            resting: false,
            next: OrderHandle::INVALID,
            prev: OrderHandle::INVALID,
        }
    }

    /// Check if the order is completely filled.
    #[inline(always)]
    pub const fn is_filled(&self) -> bool {
        self.quantity == 0
    }

    /// Reduce the remaining quantity by a fill.
    ///
    /// Debug-panics if `qty` exceeds the remainder.
    #[inline(always)]
    pub fn fill(&mut self, qty: Quantity) {
        debug_assert!(qty <= self.quantity, "fill quantity exceeds remaining");
        self.quantity -= qty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_fill() {
        let mut order = Order::new(1, 100, 10, Side::Buy, TimeInForce::GFD, None);
        assert!(!order.is_filled());

        order.fill(4);
        assert_eq!(order.quantity, 6);

        order.fill(6);
        assert!(order.is_filled());
    }

    #[test]
    fn test_new_order_is_unlinked() {
        let order = Order::new(7, 101, 5, Side::Sell, TimeInForce::IOC, Some(3));
        assert!(!order.resting);
        assert!(!order.next.is_valid());
        assert!(!order.prev.is_valid());
        assert_eq!(order.min_qty, Some(3));
    }
}
