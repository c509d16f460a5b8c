//! # Atlas Core
//!
//! Single-instrument limit order book with price-time priority.
//!
//! ## Design Principles
//! - No allocation in the match loop
//! - Orders live in a fixed slab and never move once admitted
//! - Intrusive per-level FIFOs enforce time priority
//! - Single-threaded, lock-free design

#![no_std]

extern crate alloc;

pub mod types;
pub mod order;
pub mod pool;
pub mod queue;
pub mod level;
pub mod side;
pub mod book;

pub use types::{Price, Quantity, OrderId, Side, TimeInForce, INVALID_ORDER_ID};
pub use order::Order;
pub use pool::{OrderPool, OrderHandle};
pub use queue::OrderQueue;
pub use level::PriceLevel;
pub use side::SideBook;
pub use book::{OrderBook, Trade};
