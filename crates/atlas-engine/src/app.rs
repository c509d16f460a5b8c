//! Per-symbol engine instance.
//!
//! Each symbol gets its own book, worker thread and logger thread. The
//! dispatcher maps free-form client ids to dense internal ids (monotonic
//! counter, first-seen wins) and hands commands to the worker over a bounded
//! SPSC ring. The worker owns the book, applies commands in arrival order,
//! and ships pre-formatted trade lines to the logger over a second ring.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use arrayvec::ArrayString;
use atlas_core::{OrderBook, OrderId, Price, Quantity, Side, TimeInForce};
use atlas_proto::Verb;
use atlas_ring::{channel, Consumer, Producer};

/// Capacity of the ingress and log rings.
const RING_CAPACITY: usize = 2048;

/// Initial ladder window and order capacity for each symbol.
const DEFAULT_MIN_PRICE: Price = 0;
const DEFAULT_MAX_PRICE: Price = 100_000;
const DEFAULT_POOL_CAPACITY: usize = 1_000_000;

/// A pre-formatted trade-log line; longer lines are truncated.
type LogLine = ArrayString<128>;

/// Command handed from the dispatcher to a symbol worker.
#[derive(Clone, Debug)]
pub enum Command {
    New {
        id: OrderId,
        client: String,
        side: Side,
        tif: TimeInForce,
        price: Price,
        qty: Quantity,
        min_qty: Option<Quantity>,
    },
    Cancel {
        id: OrderId,
    },
    Modify {
        id: OrderId,
        side: Side,
        price: Price,
        qty: Quantity,
        min_qty: Option<Quantity>,
    },
    Print,
    Shutdown,
}

/// One symbol's engine: id mapping, ingress ring and the two threads.
pub struct EngineApp {
    symbol: String,
    ids: HashMap<String, OrderId>,
    next_id: OrderId,
    ingress: Producer<Command>,
    worker: Option<JoinHandle<()>>,
    logger: Option<JoinHandle<()>>,
}

impl EngineApp {
    /// Start an engine for `symbol` with the default book configuration.
    pub fn new(symbol: &str) -> Self {
        Self::with_config(
            symbol,
            DEFAULT_MIN_PRICE,
            DEFAULT_MAX_PRICE,
            DEFAULT_POOL_CAPACITY,
        )
    }

    /// Start an engine with an explicit ladder window and pool capacity.
    pub fn with_config(
        symbol: &str,
        min_price: Price,
        max_price: Price,
        pool_capacity: usize,
    ) -> Self {
        let (ingress, commands) = channel::<Command>(RING_CAPACITY);
        let (log, log_lines) = channel::<LogLine>(RING_CAPACITY);
        let running = Arc::new(AtomicBool::new(true));

        let worker = {
            let symbol = symbol.to_owned();
            let running = running.clone();
            thread::spawn(move || {
                run_worker(symbol, min_price, max_price, pool_capacity, commands, log);
                running.store(false, Ordering::Release);
            })
        };
        let logger = thread::spawn(move || run_logger(log_lines, running));

        tracing::info!(symbol, "engine started");

        Self {
            symbol: symbol.to_owned(),
            ids: HashMap::new(),
            next_id: 0,
            ingress,
            worker: Some(worker),
            logger: Some(logger),
        }
    }

    /// Map a parsed command onto the worker queue.
    ///
    /// Commands with a non-positive quantity, and cancels or modifies of
    /// never-seen client ids, are dropped here.
    pub fn submit(&mut self, verb: Verb<'_>) {
        match verb {
            Verb::New {
                side,
                tif,
                price,
                qty,
                client,
                min_qty,
            } => {
                if qty <= 0 {
                    tracing::debug!(symbol = %self.symbol, client, qty, "dropped order");
                    return;
                }
                let id = self.assign_id(client);
                self.ingress.push(Command::New {
                    id,
                    client: client.to_owned(),
                    side,
                    tif,
                    price,
                    qty,
                    min_qty,
                });
            }
            Verb::Cancel { client } => {
                let Some(&id) = self.ids.get(client) else {
                    return;
                };
                self.ingress.push(Command::Cancel { id });
            }
            Verb::Modify {
                client,
                side,
                price,
                qty,
                min_qty,
            } => {
                if qty <= 0 {
                    return;
                }
                let Some(&id) = self.ids.get(client) else {
                    return;
                };
                self.ingress.push(Command::Modify {
                    id,
                    side,
                    price,
                    qty,
                    min_qty,
                });
            }
            Verb::Print => self.ingress.push(Command::Print),
        }
    }

    /// Dense internal id for a client id; first-seen wins.
    fn assign_id(&mut self, client: &str) -> OrderId {
        if let Some(&id) = self.ids.get(client) {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(client.to_owned(), id);
        id
    }
}

impl Drop for EngineApp {
    fn drop(&mut self) {
        self.ingress.push(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        if let Some(logger) = self.logger.take() {
            let _ = logger.join();
        }
        tracing::info!(symbol = %self.symbol, "engine stopped");
    }
}

fn run_worker(
    symbol: String,
    min_price: Price,
    max_price: Price,
    pool_capacity: usize,
    mut commands: Consumer<Command>,
    log: Producer<LogLine>,
) {
    let mut book = OrderBook::new(min_price, max_price, pool_capacity);
    let clients = Rc::new(RefCell::new(Vec::new()));
    install_trade_sink(&mut book, clients.clone(), symbol.clone(), log);

    let stdout = io::stdout();
    loop {
        match commands.try_pop() {
            Some(Command::Shutdown) => break,
            Some(cmd) => {
                let mut out = stdout.lock();
                if let Err(err) = apply(&mut book, &clients, &symbol, cmd, &mut out) {
                    tracing::error!(symbol = %symbol, %err, "write failed");
                }
            }
            None => thread::yield_now(),
        }
    }
    // Dropping the book releases the sink and with it the log producer.
}

/// Register the sink that turns each match into a `<symbol> TRADE …` line.
fn install_trade_sink(
    book: &mut OrderBook,
    clients: Rc<RefCell<Vec<String>>>,
    symbol: String,
    mut log: Producer<LogLine>,
) {
    book.set_trade_sink(move |trade| {
        let clients = clients.borrow();
        let resting = client_name(&clients, trade.resting_id);
        let incoming = client_name(&clients, trade.incoming_id);

        let mut line = LogLine::new();
        let _ = write!(
            line,
            "{} TRADE {} {} {} {} {} {}",
            symbol,
            resting,
            trade.resting_px,
            trade.traded_qty,
            incoming,
            trade.incoming_px,
            trade.traded_qty,
        );
        log.push(line);
    });
}

fn client_name(clients: &[String], id: OrderId) -> &str {
    clients
        .get(id as usize)
        .map(String::as_str)
        .unwrap_or("<unknown>")
}

/// Apply one command to the book on the worker thread.
fn apply<W: Write>(
    book: &mut OrderBook,
    clients: &Rc<RefCell<Vec<String>>>,
    symbol: &str,
    cmd: Command,
    out: &mut W,
) -> io::Result<()> {
    match cmd {
        Command::New {
            id,
            client,
            side,
            tif,
            price,
            qty,
            min_qty,
        } => {
            {
                // First sighting of this internal id: record the client
                // name for trade-line formatting. The borrow must end
                // before the book can emit trades.
                let mut clients = clients.borrow_mut();
                if id as usize == clients.len() {
                    clients.push(client);
                }
            }
            book.create_order(id, price, qty, side, tif, min_qty);
        }
        Command::Cancel { id } => book.cancel(id),
        Command::Modify {
            id,
            side,
            price,
            qty,
            min_qty,
        } => {
            // The wire MODIFY carries no time-in-force; recreated orders
            // are good-for-day.
            book.modify(id, side, price, qty, TimeInForce::GFD, min_qty);
        }
        Command::Print => {
            writeln!(out, "Symbol: {symbol}")?;
            let mut snap = String::new();
            let _ = book.snapshot(&mut snap);
            out.write_all(snap.as_bytes())?;
        }
        Command::Shutdown => {}
    }
    Ok(())
}

fn run_logger(mut lines: Consumer<LogLine>, running: Arc<AtomicBool>) {
    let stdout = io::stdout();
    loop {
        if let Some(line) = lines.try_pop() {
            let mut out = stdout.lock();
            let _ = writeln!(out, "{line}");
            continue;
        }
        if !running.load(Ordering::Acquire) {
            // The worker is gone; drain whatever it published last.
            match lines.try_pop() {
                Some(line) => {
                    let mut out = stdout.lock();
                    let _ = writeln!(out, "{line}");
                }
                None => break,
            }
            continue;
        }
        thread::yield_now();
    }
}
