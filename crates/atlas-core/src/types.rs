//! Scalar types shared across the book.

/// Limit price expressed in integer ticks.
pub type Price = i64;

/// Quantity in whole units; resting state is always non-negative.
pub type Quantity = i64;

/// Dense numeric order identifier assigned by the caller.
pub type OrderId = u64;

/// Sentinel marking an absent or unassigned order identifier.
pub const INVALID_ORDER_ID: OrderId = OrderId::MAX;

/// Side of the order book.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    /// Bid side (buyers).
    Buy = 0,
    /// Ask side (sellers).
    Sell = 1,
}

impl Side {
    /// Get the opposite side.
    #[inline(always)]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Check if this is the buy side.
    #[inline(always)]
    pub const fn is_buy(self) -> bool {
        matches!(self, Side::Buy)
    }
}

/// Time-in-force semantics attached to an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TimeInForce {
    /// Good-For-Day: rests on the book if not immediately filled.
    GFD = 0,
    /// Immediate-Or-Cancel: fill what crosses, discard the rest.
    IOC = 1,
    /// Fill-Or-Kill: fill entirely or reject entirely.
    FOK = 2,
}

impl TimeInForce {
    /// Check if an unfilled remainder should rest on the book.
    #[inline(always)]
    pub const fn should_rest(self) -> bool {
        matches!(self, TimeInForce::GFD)
    }
}
