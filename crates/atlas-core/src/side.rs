//! One side of the order book.
//!
//! Price levels are kept in a dense ladder indexed by `price - min_price`,
//! giving O(1) level lookup and O(1) top-of-book while the best level is
//! tracked. The ladder grows on demand in either direction and is never
//! shrunk. A parallel bitmap records which levels currently hold orders.

use alloc::vec;
use alloc::vec::Vec;

use crate::level::PriceLevel;
use crate::pool::{OrderHandle, OrderPool};
use crate::types::{Price, Quantity, Side};

/// All resting orders for one side of the market.
pub struct SideBook {
    side: Side,
    min_price: Price,
    max_price: Price,
    /// Ladder of levels, index = price - min_price.
    levels: Vec<PriceLevel>,
    /// Activity bitmap parallel to `levels`.
    active: Vec<bool>,
    /// Number of set bits in `active`.
    active_count: usize,
    /// Index of the best active level, when tracked.
    best_index: Option<usize>,
}

impl SideBook {
    /// Create a side book covering `[min_price, max_price]`.
    ///
    /// The bounds are swapped when given in reverse order.
    pub fn new(side: Side, min_price: Price, max_price: Price) -> Self {
        let (min_price, max_price) = if min_price > max_price {
            (max_price, min_price)
        } else {
            (min_price, max_price)
        };
        let span = (max_price - min_price + 1) as usize;
        let levels = (0..span)
            .map(|i| PriceLevel::new(min_price + i as Price))
            .collect();

        Self {
            side,
            min_price,
            max_price,
            levels,
            active: vec![false; span],
            active_count: 0,
            best_index: None,
        }
    }

    /// Check if no active levels remain.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.active_count == 0
    }

    #[inline(always)]
    fn index_of(&self, price: Price) -> usize {
        (price - self.min_price) as usize
    }

    #[inline(always)]
    fn price_at(&self, idx: usize) -> Price {
        self.min_price + idx as Price
    }

    /// Grow the ladder so that `price` is addressable.
    fn ensure_price(&mut self, price: Price) {
        if price < self.min_price {
            let add = (self.min_price - price) as usize;
            let mut levels = Vec::with_capacity(self.levels.len() + add);
            levels.extend((0..add).map(|i| PriceLevel::new(price + i as Price)));
            levels.append(&mut self.levels);
            self.levels = levels;

            let mut active = vec![false; add];
            active.append(&mut self.active);
            self.active = active;

            if let Some(best) = self.best_index.as_mut() {
                *best += add;
            }
            self.min_price = price;
        } else if price > self.max_price {
            let add = (price - self.max_price) as usize;
            let base = self.max_price;
            self.levels
                .extend((1..=add).map(|i| PriceLevel::new(base + i as Price)));
            self.active.resize(self.levels.len(), false);
            self.max_price = price;
        }
    }

    fn update_best_on_insert(&mut self, idx: usize) {
        match self.best_index {
            None => self.best_index = Some(idx),
            Some(best) => {
                let better = match self.side {
                    Side::Buy => idx > best,
                    Side::Sell => idx < best,
                };
                if better {
                    self.best_index = Some(idx);
                }
            }
        }
    }

    /// Linear scan for the best active level.
    fn recompute_best(&mut self) {
        self.best_index = None;
        if self.active_count == 0 {
            return;
        }
        match self.side {
            Side::Buy => {
                self.best_index = self.active.iter().rposition(|&a| a);
            }
            Side::Sell => {
                self.best_index = self.active.iter().position(|&a| a);
            }
        }
    }

    fn next_active_after(&self, idx: usize) -> Option<usize> {
        self.active[idx + 1..]
            .iter()
            .position(|&a| a)
            .map(|off| idx + 1 + off)
    }

    fn prev_active_before(&self, idx: usize) -> Option<usize> {
        self.active[..idx].iter().rposition(|&a| a)
    }

    fn deactivate(&mut self, idx: usize) {
        if self.active[idx] {
            self.active[idx] = false;
            self.active_count = self.active_count.saturating_sub(1);
        }
    }

    /// Insert an order into its price level, expanding the ladder if needed.
    pub fn add(&mut self, pool: &mut OrderPool, handle: OrderHandle) {
        let price = pool.get(handle).price;
        self.ensure_price(price);
        let idx = self.index_of(price);
        if !self.active[idx] {
            self.active[idx] = true;
            self.active_count += 1;
            self.update_best_on_insert(idx);
        }
        self.levels[idx].add(pool, handle);
    }

    /// Remove a resting order from its price level.
    pub fn remove(&mut self, pool: &mut OrderPool, handle: OrderHandle) {
        let price = pool.get(handle).price;
        if price < self.min_price || price > self.max_price {
            return;
        }
        let idx = self.index_of(price);
        self.levels[idx].remove(pool, handle);
        if self.levels[idx].is_empty() && self.active[idx] {
            self.deactivate(idx);
            if self.best_index == Some(idx) {
                self.recompute_best();
            }
        }
    }

    /// Handle of the best resting order (highest bid or lowest ask).
    ///
    /// Levels emptied by fills are deactivated and skipped along the way.
    pub fn best(&mut self) -> Option<OrderHandle> {
        loop {
            let idx = match self.best_index {
                Some(idx) => idx,
                None => {
                    self.recompute_best();
                    self.best_index?
                }
            };
            if let Some(handle) = self.levels[idx].top() {
                return Some(handle);
            }
            self.deactivate(idx);
            self.best_index = None;
        }
    }

    /// Apply a fill delta to the level at `price`.
    pub fn on_fill(&mut self, price: Price, delta: Quantity) {
        if price < self.min_price || price > self.max_price {
            return;
        }
        let idx = self.index_of(price);
        self.levels[idx].on_fill(delta);
        if self.levels[idx].total() == 0 && self.levels[idx].is_empty() && self.active[idx] {
            self.deactivate(idx);
            if self.best_index == Some(idx) {
                self.recompute_best();
            }
        }
    }

    /// Aggregate quantity resting at prices that cross `limit_price`.
    ///
    /// Walks active levels outward from the best: upward through asks for an
    /// incoming buy, downward through bids for an incoming sell. Returns 0
    /// when the book is empty or the best level already fails the predicate.
    pub fn available_to(&self, limit_price: Price, incoming_side: Side) -> Quantity {
        let Some(best) = self.best_index else {
            return 0;
        };
        let mut total = 0;
        match incoming_side {
            Side::Buy => {
                let mut idx = best;
                while self.price_at(idx) <= limit_price {
                    if self.active[idx] {
                        total += self.levels[idx].total();
                    }
                    match self.next_active_after(idx) {
                        Some(next) => idx = next,
                        None => break,
                    }
                }
            }
            Side::Sell => {
                let mut idx = best;
                while self.price_at(idx) >= limit_price {
                    if self.active[idx] {
                        total += self.levels[idx].total();
                    }
                    match self.prev_active_before(idx) {
                        Some(prev) => idx = prev,
                        None => break,
                    }
                }
            }
        }
        total
    }

    /// Active levels in ascending price order.
    pub fn active_levels(&self) -> impl DoubleEndedIterator<Item = &PriceLevel> + '_ {
        self.levels
            .iter()
            .zip(self.active.iter())
            .filter_map(|(level, &active)| active.then_some(level))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use alloc::vec;

    use super::*;
    use crate::order::Order;
    use crate::types::TimeInForce;

    fn insert(
        book: &mut SideBook,
        pool: &mut OrderPool,
        id: u64,
        price: Price,
        qty: Quantity,
        side: Side,
    ) -> OrderHandle {
        let handle = pool
            .create(Order::new(id, price, qty, side, TimeInForce::GFD, None))
            .unwrap();
        book.add(pool, handle);
        handle
    }

    #[test]
    fn test_best_tracking_bids() {
        let mut pool = OrderPool::new(16);
        let mut book = SideBook::new(Side::Buy, 90, 110);

        let a = insert(&mut book, &mut pool, 1, 100, 5, Side::Buy);
        assert_eq!(book.best(), Some(a));

        let b = insert(&mut book, &mut pool, 2, 105, 5, Side::Buy);
        assert_eq!(book.best(), Some(b));

        insert(&mut book, &mut pool, 3, 95, 5, Side::Buy);
        assert_eq!(book.best(), Some(b));
    }

    #[test]
    fn test_best_tracking_asks() {
        let mut pool = OrderPool::new(16);
        let mut book = SideBook::new(Side::Sell, 90, 110);

        let a = insert(&mut book, &mut pool, 1, 100, 5, Side::Sell);
        let b = insert(&mut book, &mut pool, 2, 95, 5, Side::Sell);
        insert(&mut book, &mut pool, 3, 105, 5, Side::Sell);

        assert_eq!(book.best(), Some(b));

        book.remove(&mut pool, b);
        assert_eq!(book.best(), Some(a));
    }

    #[test]
    fn test_remove_recomputes_best() {
        let mut pool = OrderPool::new(16);
        let mut book = SideBook::new(Side::Buy, 90, 110);

        let a = insert(&mut book, &mut pool, 1, 100, 5, Side::Buy);
        let b = insert(&mut book, &mut pool, 2, 105, 5, Side::Buy);

        book.remove(&mut pool, b);
        assert_eq!(book.best(), Some(a));

        book.remove(&mut pool, a);
        assert_eq!(book.best(), None);
        assert!(book.is_empty());
    }

    #[test]
    fn test_ladder_grows_above() {
        let mut pool = OrderPool::new(16);
        let mut book = SideBook::new(Side::Sell, 100, 101);

        let a = insert(&mut book, &mut pool, 1, 150, 5, Side::Sell);
        let b = insert(&mut book, &mut pool, 2, 120, 3, Side::Sell);

        assert_eq!(book.best(), Some(b));
        book.remove(&mut pool, b);
        assert_eq!(book.best(), Some(a));
    }

    #[test]
    fn test_ladder_grows_below_keeps_best() {
        let mut pool = OrderPool::new(16);
        let mut book = SideBook::new(Side::Buy, 100, 101);

        let a = insert(&mut book, &mut pool, 1, 101, 5, Side::Buy);
        // Prepending levels must shift the tracked best index.
        insert(&mut book, &mut pool, 2, 40, 3, Side::Buy);

        assert_eq!(book.best(), Some(a));

        let prices: Vec<Price> = book.active_levels().map(|l| l.price()).collect();
        assert_eq!(prices, vec![40, 101]);
    }

    #[test]
    fn test_fill_emptied_best_is_skipped() {
        let mut pool = OrderPool::new(16);
        let mut book = SideBook::new(Side::Sell, 90, 110);

        let a = insert(&mut book, &mut pool, 1, 100, 5, Side::Sell);
        let b = insert(&mut book, &mut pool, 2, 101, 5, Side::Sell);

        // Drain the best order in place, as the match loop does.
        pool.get_mut(a).fill(5);
        book.on_fill(100, 5);
        book.remove(&mut pool, a);

        assert_eq!(book.best(), Some(b));
    }

    #[test]
    fn test_available_to_windows() {
        let mut pool = OrderPool::new(16);
        let mut asks = SideBook::new(Side::Sell, 90, 110);

        insert(&mut asks, &mut pool, 1, 100, 5, Side::Sell);
        insert(&mut asks, &mut pool, 2, 101, 7, Side::Sell);
        insert(&mut asks, &mut pool, 3, 102, 3, Side::Sell);

        assert_eq!(asks.available_to(99, Side::Buy), 0);
        assert_eq!(asks.available_to(100, Side::Buy), 5);
        assert_eq!(asks.available_to(101, Side::Buy), 12);
        assert_eq!(asks.available_to(110, Side::Buy), 15);

        let mut bids = SideBook::new(Side::Buy, 90, 110);
        insert(&mut bids, &mut pool, 4, 98, 4, Side::Buy);
        insert(&mut bids, &mut pool, 5, 99, 2, Side::Buy);

        assert_eq!(bids.available_to(100, Side::Sell), 0);
        assert_eq!(bids.available_to(99, Side::Sell), 2);
        assert_eq!(bids.available_to(90, Side::Sell), 6);
    }

    #[test]
    fn test_available_to_empty_book() {
        let book = SideBook::new(Side::Sell, 90, 110);
        assert_eq!(book.available_to(200, Side::Buy), 0);
    }

    #[test]
    fn test_active_levels_ascending() {
        let mut pool = OrderPool::new(16);
        let mut book = SideBook::new(Side::Buy, 90, 110);

        insert(&mut book, &mut pool, 1, 99, 4, Side::Buy);
        insert(&mut book, &mut pool, 2, 98, 1, Side::Buy);
        insert(&mut book, &mut pool, 3, 103, 2, Side::Buy);

        let prices: Vec<Price> = book.active_levels().map(|l| l.price()).collect();
        assert_eq!(prices, vec![98, 99, 103]);
    }

    #[test]
    fn test_reversed_bounds_are_swapped() {
        let mut pool = OrderPool::new(4);
        let mut book = SideBook::new(Side::Buy, 110, 90);
        let a = insert(&mut book, &mut pool, 1, 100, 1, Side::Buy);
        assert_eq!(book.best(), Some(a));
    }
}
