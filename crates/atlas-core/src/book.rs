//! The order book: both sides, the order slab, the ID index and the match
//! pipeline.
//!
//! An incoming order goes through three steps: admission (FOK and
//! minimum-quantity checks against the crossable liquidity, before any side
//! effect), the match loop (best-first against the opposite side, FIFO
//! within a level), and residual placement (GFD remainders rest, everything
//! else is released). Trades are reported synchronously through the
//! registered sink, in match order.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::{self, Write};

use crate::order::Order;
use crate::pool::{OrderHandle, OrderPool};
use crate::side::SideBook;
use crate::types::{OrderId, Price, Quantity, Side, TimeInForce, INVALID_ORDER_ID};

/// A single match between a resting and an incoming order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trade {
    /// Identifier of the resting order.
    pub resting_id: OrderId,
    /// Price of the resting order (the execution price).
    pub resting_px: Price,
    /// Quantity exchanged.
    pub traded_qty: Quantity,
    /// Identifier of the incoming order.
    pub incoming_id: OrderId,
    /// Limit price of the incoming order.
    pub incoming_px: Price,
}

type TradeSink = Box<dyn FnMut(&Trade)>;

/// A complete single-instrument limit order book.
pub struct OrderBook {
    pool: OrderPool,
    bids: SideBook,
    asks: SideBook,
    /// id -> handle, grown on demand; `INVALID` marks an absent id.
    index: Vec<OrderHandle>,
    on_trade: Option<TradeSink>,
}

impl OrderBook {
    /// Create a book whose ladders initially cover `[min_price, max_price]`
    /// and whose pool holds up to `pool_capacity` live orders.
    pub fn new(min_price: Price, max_price: Price, pool_capacity: usize) -> Self {
        Self {
            pool: OrderPool::new(pool_capacity),
            bids: SideBook::new(Side::Buy, min_price, max_price),
            asks: SideBook::new(Side::Sell, min_price, max_price),
            index: Vec::new(),
            on_trade: None,
        }
    }

    /// Install the sink invoked synchronously for each match.
    pub fn set_trade_sink<F>(&mut self, sink: F)
    where
        F: FnMut(&Trade) + 'static,
    {
        self.on_trade = Some(Box::new(sink));
    }

    /// Check whether `id` names a live order.
    #[inline(always)]
    pub fn has_order(&self, id: OrderId) -> bool {
        self.lookup(id).is_some()
    }

    /// Get the live order named `id`, if any.
    #[inline(always)]
    pub fn find(&self, id: OrderId) -> Option<&Order> {
        self.lookup(id).map(|handle| self.pool.get(handle))
    }

    #[inline(always)]
    fn lookup(&self, id: OrderId) -> Option<OrderHandle> {
        let handle = *self.index.get(id as usize)?;
        handle.is_valid().then_some(handle)
    }

    /// Submit a new order.
    ///
    /// Rejections (duplicate id, pool exhaustion, failed FOK or minimum-fill
    /// admission) return `None` without emitting trades or leaving partial
    /// state. `None` is also returned when the order was retired during
    /// processing: fully filled, or IOC/FOK with a remainder.
    pub fn create_order(
        &mut self,
        id: OrderId,
        price: Price,
        qty: Quantity,
        side: Side,
        tif: TimeInForce,
        min_qty: Option<Quantity>,
    ) -> Option<&Order> {
        debug_assert!(id != INVALID_ORDER_ID, "sentinel id");
        debug_assert!(qty > 0, "non-positive quantity");

        if id as usize >= self.index.len() {
            self.index.resize(id as usize + 1, OrderHandle::INVALID);
        }
        if self.index[id as usize].is_valid() {
            return None;
        }

        let handle = self
            .pool
            .create(Order::new(id, price, qty, side, tif, min_qty))?;
        self.index[id as usize] = handle;

        self.execute(handle);

        self.find(id)
    }

    /// Cancel the order named `id`. Unknown ids are a no-op.
    pub fn cancel(&mut self, id: OrderId) {
        let Some(handle) = self.lookup(id) else {
            return;
        };
        let order = self.pool.get(handle);
        if order.resting {
            match order.side {
                Side::Buy => self.bids.remove(&mut self.pool, handle),
                Side::Sell => self.asks.remove(&mut self.pool, handle),
            }
        }
        self.index[id as usize] = OrderHandle::INVALID;
        self.pool.destroy(handle);
    }

    /// Replace the order named `id`, keeping the identifier.
    ///
    /// Cancel-then-recreate: all time priority is lost, and the recreated
    /// order runs the full pipeline, so a side or price change can match.
    /// Unknown ids are a no-op.
    pub fn modify(
        &mut self,
        id: OrderId,
        side: Side,
        price: Price,
        qty: Quantity,
        tif: TimeInForce,
        min_qty: Option<Quantity>,
    ) {
        if !self.has_order(id) {
            return;
        }
        self.cancel(id);
        self.create_order(id, price, qty, side, tif, min_qty);
    }

    /// Write the top-of-book snapshot: `SELL:` with ask levels in ascending
    /// price order, then `BUY:` with bid levels descending. Only levels with
    /// positive aggregate quantity are emitted.
    pub fn snapshot<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_str("SELL:\n")?;
        for level in self.asks.active_levels().filter(|l| l.total() > 0) {
            writeln!(out, "{} {}", level.price(), level.total())?;
        }
        out.write_str("BUY:\n")?;
        for level in self.bids.active_levels().filter(|l| l.total() > 0).rev() {
            writeln!(out, "{} {}", level.price(), level.total())?;
        }
        Ok(())
    }

    /// Run the match/placement pipeline for a freshly admitted order.
    fn execute(&mut self, incoming: OrderHandle) {
        let (id, price, qty, side, tif, min_qty) = {
            let order = self.pool.get(incoming);
            (
                order.id,
                order.price,
                order.quantity,
                order.side,
                order.tif,
                order.min_qty,
            )
        };

        // Admission runs before any side effect so a rejected FOK or
        // minimum-fill order emits nothing.
        let available = match side {
            Side::Buy => self.asks.available_to(price, side),
            Side::Sell => self.bids.available_to(price, side),
        };
        if tif == TimeInForce::FOK && available < qty {
            self.cancel(id);
            return;
        }
        if let Some(floor) = min_qty {
            if available < floor {
                self.cancel(id);
                return;
            }
        }

        while self.pool.get(incoming).quantity > 0 {
            let resting = match side {
                Side::Buy => self.asks.best(),
                Side::Sell => self.bids.best(),
            };
            let Some(resting) = resting else { break };

            let (resting_id, resting_px, resting_qty) = {
                let order = self.pool.get(resting);
                (order.id, order.price, order.quantity)
            };
            let crosses = match side {
                Side::Buy => price >= resting_px,
                Side::Sell => price <= resting_px,
            };
            if !crosses {
                break;
            }

            let traded = self.pool.get(incoming).quantity.min(resting_qty);
            self.pool.get_mut(incoming).fill(traded);
            self.pool.get_mut(resting).fill(traded);
            match side {
                Side::Buy => self.asks.on_fill(resting_px, traded),
                Side::Sell => self.bids.on_fill(resting_px, traded),
            }

            if let Some(sink) = self.on_trade.as_mut() {
                sink(&Trade {
                    resting_id,
                    resting_px,
                    traded_qty: traded,
                    incoming_id: id,
                    incoming_px: price,
                });
            }

            if resting_qty == traded {
                self.cancel(resting_id);
            }

            if tif == TimeInForce::IOC {
                self.cancel(id);
                return;
            }
        }

        if self.pool.get(incoming).quantity > 0 && tif.should_rest() {
            match side {
                Side::Buy => self.bids.add(&mut self.pool, incoming),
                Side::Sell => self.asks.add(&mut self.pool, incoming),
            }
        } else {
            self.cancel(id);
        }
    }
}
