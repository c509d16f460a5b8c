//! Command line parser.

use atlas_core::{Price, Quantity, Side, TimeInForce};

/// Parse error types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Line contains no tokens.
    EmptyLine,
    /// Verb token is not one of the recognized commands.
    UnknownVerb,
    /// A required field is missing.
    MissingField,
    /// A numeric field failed to parse.
    InvalidNumber,
    /// Time-in-force token is not GFD, IOC or FOK.
    InvalidTimeInForce,
    /// Side token is not BUY or SELL.
    InvalidSide,
    /// `MIN` suffix without a quantity.
    MissingMinQuantity,
}

/// One parsed command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line<'a> {
    /// Instrument symbol the command addresses.
    pub symbol: &'a str,
    /// The command payload.
    pub verb: Verb<'a>,
}

/// Command payload, with client identifiers borrowed from the line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb<'a> {
    /// Submit a new order.
    New {
        side: Side,
        tif: TimeInForce,
        price: Price,
        qty: Quantity,
        client: &'a str,
        min_qty: Option<Quantity>,
    },
    /// Cancel an existing order.
    Cancel { client: &'a str },
    /// Replace an existing order, losing time priority.
    Modify {
        client: &'a str,
        side: Side,
        price: Price,
        qty: Quantity,
        min_qty: Option<Quantity>,
    },
    /// Print the book snapshot.
    Print,
}

fn parse_tif(token: &str) -> Result<TimeInForce, ParseError> {
    match token {
        "GFD" => Ok(TimeInForce::GFD),
        "IOC" => Ok(TimeInForce::IOC),
        "FOK" => Ok(TimeInForce::FOK),
        _ => Err(ParseError::InvalidTimeInForce),
    }
}

fn parse_side(token: &str) -> Result<Side, ParseError> {
    match token {
        "BUY" => Ok(Side::Buy),
        "SELL" => Ok(Side::Sell),
        _ => Err(ParseError::InvalidSide),
    }
}

fn parse_num(token: &str) -> Result<i64, ParseError> {
    token.parse().map_err(|_| ParseError::InvalidNumber)
}

/// Scan the remaining tokens for a trailing `MIN <q>` clause.
fn parse_min_suffix<'a, I>(mut tokens: I) -> Result<Option<Quantity>, ParseError>
where
    I: Iterator<Item = &'a str>,
{
    let mut min_qty = None;
    while let Some(token) = tokens.next() {
        if token == "MIN" {
            let q = tokens.next().ok_or(ParseError::MissingMinQuantity)?;
            min_qty = Some(parse_num(q)?);
        }
    }
    Ok(min_qty)
}

/// Parse one command line.
pub fn parse_line(line: &str) -> Result<Line<'_>, ParseError> {
    let mut tokens = line.split_whitespace();
    let symbol = tokens.next().ok_or(ParseError::EmptyLine)?;
    let verb = tokens.next().ok_or(ParseError::MissingField)?;

    let verb = match verb {
        "BUY" | "SELL" => {
            let side = parse_side(verb)?;
            let tif = parse_tif(tokens.next().ok_or(ParseError::MissingField)?)?;
            let price = parse_num(tokens.next().ok_or(ParseError::MissingField)?)?;
            let qty = parse_num(tokens.next().ok_or(ParseError::MissingField)?)?;
            let client = tokens.next().ok_or(ParseError::MissingField)?;
            let min_qty = parse_min_suffix(tokens)?;
            Verb::New {
                side,
                tif,
                price,
                qty,
                client,
                min_qty,
            }
        }
        "CANCEL" => {
            let client = tokens.next().ok_or(ParseError::MissingField)?;
            Verb::Cancel { client }
        }
        "MODIFY" => {
            let client = tokens.next().ok_or(ParseError::MissingField)?;
            let side = parse_side(tokens.next().ok_or(ParseError::MissingField)?)?;
            let price = parse_num(tokens.next().ok_or(ParseError::MissingField)?)?;
            let qty = parse_num(tokens.next().ok_or(ParseError::MissingField)?)?;
            let min_qty = parse_min_suffix(tokens)?;
            Verb::Modify {
                client,
                side,
                price,
                qty,
                min_qty,
            }
        }
        "PRINT" => Verb::Print,
        _ => return Err(ParseError::UnknownVerb),
    };

    Ok(Line { symbol, verb })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_new_order() {
        let line = parse_line("AAPL BUY GFD 100 10 ord1").unwrap();
        assert_eq!(line.symbol, "AAPL");
        assert_eq!(
            line.verb,
            Verb::New {
                side: Side::Buy,
                tif: TimeInForce::GFD,
                price: 100,
                qty: 10,
                client: "ord1",
                min_qty: None,
            }
        );
    }

    #[test]
    fn test_parse_sell_with_min() {
        let line = parse_line("MSFT SELL FOK 250 40 ask7 MIN 15").unwrap();
        assert_eq!(
            line.verb,
            Verb::New {
                side: Side::Sell,
                tif: TimeInForce::FOK,
                price: 250,
                qty: 40,
                client: "ask7",
                min_qty: Some(15),
            }
        );
    }

    #[test]
    fn test_parse_cancel() {
        let line = parse_line("AAPL CANCEL ord1").unwrap();
        assert_eq!(line.verb, Verb::Cancel { client: "ord1" });
    }

    #[test]
    fn test_parse_modify() {
        let line = parse_line("AAPL MODIFY ord1 SELL 101 5").unwrap();
        assert_eq!(
            line.verb,
            Verb::Modify {
                client: "ord1",
                side: Side::Sell,
                price: 101,
                qty: 5,
                min_qty: None,
            }
        );
    }

    #[test]
    fn test_parse_modify_with_min() {
        let line = parse_line("AAPL MODIFY ord1 BUY 99 8 MIN 3").unwrap();
        assert_eq!(
            line.verb,
            Verb::Modify {
                client: "ord1",
                side: Side::Buy,
                price: 99,
                qty: 8,
                min_qty: Some(3),
            }
        );
    }

    #[test]
    fn test_parse_print() {
        let line = parse_line("AAPL PRINT").unwrap();
        assert_eq!(line.verb, Verb::Print);
    }

    #[test]
    fn test_negative_price_parses() {
        // Prices are signed ticks; the parser does not police the range.
        let line = parse_line("SPRD BUY GFD -5 10 leg1").unwrap();
        assert!(matches!(line.verb, Verb::New { price: -5, .. }));
    }

    #[test]
    fn test_rejects() {
        assert_eq!(parse_line("   "), Err(ParseError::EmptyLine));
        assert_eq!(parse_line("AAPL"), Err(ParseError::MissingField));
        assert_eq!(parse_line("AAPL HOLD 1 2 x"), Err(ParseError::UnknownVerb));
        assert_eq!(
            parse_line("AAPL BUY GFD 100 10"),
            Err(ParseError::MissingField)
        );
        assert_eq!(
            parse_line("AAPL BUY SOON 100 10 ord1"),
            Err(ParseError::InvalidTimeInForce)
        );
        assert_eq!(
            parse_line("AAPL BUY GFD abc 10 ord1"),
            Err(ParseError::InvalidNumber)
        );
        assert_eq!(
            parse_line("AAPL MODIFY ord1 HOLD 100 10"),
            Err(ParseError::InvalidSide)
        );
        assert_eq!(
            parse_line("AAPL BUY GFD 100 10 ord1 MIN"),
            Err(ParseError::MissingMinQuantity)
        );
        assert_eq!(parse_line("AAPL CANCEL"), Err(ParseError::MissingField));
    }
}
