//! Order text parser.
//!
//! Turns order text like `A par - bur`, `F nth C A lon - bel` or the
//! bit form `mun Support ber sil` into `Order` values. Verbs and unit
//! types are case-insensitive and provinces are lower-cased. A variant's
//! `OrderParser` then restricts which order kinds and unit types it
//! accepts and checks every province against the map.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::board::{Graph, Nation, Order, OrderKind, Province, UnitType};

/// Errors raised while parsing order text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty order")]
    Empty,

    #[error("unknown order verb '{0}'")]
    UnknownVerb(String),

    #[error("unknown unit type '{0}'")]
    UnknownUnitType(String),

    #[error("unexpected end of order, expected {0}")]
    UnexpectedEnd(&'static str),

    #[error("unexpected token '{found}', expected {expected}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },

    #[error("{} orders are not allowed", .0.name())]
    UnsupportedKind(OrderKind),

    #[error("{0} units are not allowed")]
    UnsupportedUnitType(UnitType),

    #[error("unknown province '{0}'")]
    UnknownProvince(Province),

    #[error("{nation} {province}: {source}")]
    Submission {
        nation: Nation,
        province: Province,
        #[source]
        source: Box<ParseError>,
    },
}

/// Orders as submitted: nation, then the ordered province, then the
/// remaining order tokens (verb and targets).
pub type Submission = BTreeMap<Nation, BTreeMap<Province, Vec<String>>>;

/// Splits order text on whitespace and on `-`, keeping `-` as a token.
pub fn tokenize(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in s.split_whitespace() {
        let mut rest = word;
        while let Some(i) = rest.find('-') {
            if i > 0 {
                tokens.push(rest[..i].to_string());
            }
            tokens.push("-".to_string());
            rest = &rest[i + 1..];
        }
        if !rest.is_empty() {
            tokens.push(rest.to_string());
        }
    }
    tokens
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Hold,
    Move,
    MoveViaConvoy,
    Support,
    Convoy,
    Build,
    Disband,
}

fn verb(token: &str) -> Option<Verb> {
    let verb = match token.to_ascii_lowercase().as_str() {
        "hold" | "h" => Verb::Hold,
        "move" | "-" => Verb::Move,
        "moveviaconvoy" => Verb::MoveViaConvoy,
        "support" | "s" => Verb::Support,
        "convoy" | "c" => Verb::Convoy,
        "build" | "b" => Verb::Build,
        "disband" | "d" => Verb::Disband,
        _ => return None,
    };
    Some(verb)
}

/// Cursor over a token list.
struct Tokens<'t> {
    tokens: &'t [String],
    pos: usize,
}

impl<'t> Tokens<'t> {
    fn new(tokens: &'t [String]) -> Self {
        Tokens { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'t str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn next(&mut self, expected: &'static str) -> Result<&'t str, ParseError> {
        let token = self.peek().ok_or(ParseError::UnexpectedEnd(expected))?;
        self.pos += 1;
        Ok(token)
    }

    fn province(&mut self, expected: &'static str) -> Result<Province, ParseError> {
        let token = self.next(expected)?;
        if token == "-" {
            return Err(ParseError::UnexpectedToken {
                expected,
                found: token.to_string(),
            });
        }
        Ok(Province::new(token.to_lowercase()))
    }

    /// Consumes a unit type token, but only when more tokens follow it, so
    /// that a trailing province is never mistaken for one.
    fn unit_prefix(&mut self) -> Option<UnitType> {
        let unit_type = self.peek()?.parse().ok()?;
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
            Some(unit_type)
        } else {
            None
        }
    }

    /// Consumes the next token if it is one of `words`, ignoring case.
    fn eat(&mut self, words: &[&str]) -> bool {
        match self.peek() {
            Some(token) if words.iter().any(|w| token.eq_ignore_ascii_case(w)) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn finish(&self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(ParseError::UnexpectedToken {
                expected: "end of order",
                found: token.to_string(),
            }),
        }
    }
}

/// Parses one order from its tokens.
pub fn parse_tokens(tokens: &[String]) -> Result<Order, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut t = Tokens::new(tokens);
    let leading = t.unit_prefix();
    let at = t.province("source province")?;
    let token = t.next("order verb")?;
    let verb = verb(token).ok_or_else(|| ParseError::UnknownVerb(token.to_string()))?;

    let order = match verb {
        Verb::Hold => Order::Hold { at },
        Verb::Move | Verb::MoveViaConvoy => {
            let to = t.province("destination")?;
            let via_convoy = verb == Verb::MoveViaConvoy || (t.eat(&["via"]) && t.eat(&["convoy"]));
            Order::Move {
                from: at,
                to,
                via_convoy,
            }
        }
        Verb::Support => {
            t.unit_prefix();
            let target = t.province("supported province")?;
            t.eat(&["-", "move"]);
            match t.peek() {
                None => Order::SupportHold { at, target },
                Some(_) => {
                    let to = t.province("support destination")?;
                    if to == target {
                        Order::SupportHold { at, target }
                    } else {
                        Order::SupportMove {
                            at,
                            from: target,
                            to,
                        }
                    }
                }
            }
        }
        Verb::Convoy => {
            t.unit_prefix();
            let from = t.province("convoyed army")?;
            t.eat(&["-", "move"]);
            let to = t.province("convoy destination")?;
            Order::Convoy { at, from, to }
        }
        Verb::Build => {
            let unit_type = match t.peek() {
                Some(token) => {
                    t.pos += 1;
                    token
                        .parse()
                        .map_err(|_| ParseError::UnknownUnitType(token.to_string()))?
                }
                None => leading.ok_or(ParseError::UnexpectedEnd("unit type"))?,
            };
            Order::Build { at, unit_type }
        }
        Verb::Disband => Order::Disband { at },
    };
    t.finish()?;
    Ok(order)
}

/// Parses one order from text.
pub fn parse_order(s: &str) -> Result<Order, ParseError> {
    parse_tokens(&tokenize(s))
}

/// A variant's order parser: the order kinds and unit types it accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderParser {
    kinds: Vec<OrderKind>,
    unit_types: Vec<UnitType>,
    build_anywhere: bool,
}

impl OrderParser {
    pub fn new(kinds: &[OrderKind], unit_types: &[UnitType]) -> Self {
        OrderParser {
            kinds: kinds.to_vec(),
            unit_types: unit_types.to_vec(),
            build_anywhere: false,
        }
    }

    /// Makes every parsed Build a build-anywhere order.
    pub fn with_build_anywhere(mut self, build_anywhere: bool) -> Self {
        self.build_anywhere = build_anywhere;
        self
    }

    pub fn kinds(&self) -> &[OrderKind] {
        &self.kinds
    }

    pub fn unit_types(&self) -> &[UnitType] {
        &self.unit_types
    }

    /// Parses `s` and checks it against this parser and the map.
    pub fn parse(&self, graph: &Graph, s: &str) -> Result<Order, ParseError> {
        self.accept(graph, parse_order(s)?)
    }

    fn accept(&self, graph: &Graph, order: Order) -> Result<Order, ParseError> {
        let kind = order.kind();
        if !self.kinds.contains(&kind) {
            return Err(ParseError::UnsupportedKind(kind));
        }
        if let Some(p) = order.provinces().into_iter().find(|p| !graph.has(p)) {
            return Err(ParseError::UnknownProvince(p.clone()));
        }
        match order {
            Order::Build { at, unit_type } | Order::BuildAnywhere { at, unit_type } => {
                if !self.unit_types.contains(&unit_type) {
                    return Err(ParseError::UnsupportedUnitType(unit_type));
                }
                if self.build_anywhere {
                    Ok(Order::BuildAnywhere { at, unit_type })
                } else {
                    Ok(Order::Build { at, unit_type })
                }
            }
            order => Ok(order),
        }
    }

    /// Parses a whole submission into per-nation order lists.
    ///
    /// Each entry's province is prepended to its tokens. The first bad
    /// entry fails the submission, naming the nation and province.
    pub fn parse_submission(
        &self,
        graph: &Graph,
        submission: &Submission,
    ) -> Result<BTreeMap<Nation, Vec<Order>>, ParseError> {
        let mut parsed = BTreeMap::new();
        for (nation, entries) in submission {
            let mut orders = Vec::with_capacity(entries.len());
            for (province, bits) in entries {
                let mut text = province.to_string();
                for bit in bits {
                    text.push(' ');
                    text.push_str(bit);
                }
                let order = self
                    .parse(graph, &text)
                    .map_err(|e| ParseError::Submission {
                        nation: nation.clone(),
                        province: province.clone(),
                        source: Box::new(e),
                    })?;
                orders.push(order);
            }
            parsed.insert(nation.clone(), orders);
        }
        Ok(parsed)
    }
}

impl Default for OrderParser {
    fn default() -> Self {
        OrderParser::new(&OrderKind::ALL, &[UnitType::Army, UnitType::Fleet])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Flags;

    fn graph() -> Graph {
        Graph::builder()
            .province("par")
            .flag(Flags::LAND)
            .connect_both("bur", Flags::LAND)
            .province("bur")
            .flag(Flags::LAND)
            .province("stp")
            .flag(Flags::LAND)
            .province("stp/nc")
            .flag(Flags::SEA)
            .build()
    }

    fn strings(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn tokenize_splits_dashes() {
        assert_eq!(tokenize("A par-bur"), strings(&["A", "par", "-", "bur"]));
        assert_eq!(tokenize("  par  -  bur "), strings(&["par", "-", "bur"]));
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn parse_hold_and_disband() {
        assert_eq!(parse_order("A par H"), Ok(Order::hold("par")));
        assert_eq!(parse_order("par hold"), Ok(Order::hold("par")));
        assert_eq!(parse_order("F stp/nc D"), Ok(Order::disband("stp/nc")));
    }

    #[test]
    fn parse_moves() {
        assert_eq!(parse_order("A PAR - BUR"), Ok(Order::move_to("par", "bur")));
        assert_eq!(parse_order("par Move bur"), Ok(Order::move_to("par", "bur")));
        assert_eq!(
            parse_order("A lon - bel via convoy"),
            Ok(Order::move_via_convoy("lon", "bel"))
        );
        assert_eq!(
            parse_order("lon MoveViaConvoy bel"),
            Ok(Order::move_via_convoy("lon", "bel"))
        );
    }

    #[test]
    fn parse_supports() {
        assert_eq!(
            parse_order("A mun S A ber - sil"),
            Ok(Order::support_move("mun", "ber", "sil"))
        );
        assert_eq!(parse_order("A mun S A ber"), Ok(Order::support_hold("mun", "ber")));
        assert_eq!(
            parse_order("mun Support ber sil"),
            Ok(Order::support_move("mun", "ber", "sil"))
        );
        assert_eq!(
            parse_order("mun Support ber ber"),
            Ok(Order::support_hold("mun", "ber"))
        );
    }

    #[test]
    fn parse_convoys_and_builds() {
        assert_eq!(
            parse_order("F nth C A lon - bel"),
            Ok(Order::convoy("nth", "lon", "bel"))
        );
        assert_eq!(parse_order("nth Convoy lon bel"), Ok(Order::convoy("nth", "lon", "bel")));
        assert_eq!(parse_order("par Build Army"), Ok(Order::build("par", UnitType::Army)));
        assert_eq!(parse_order("F bre B"), Ok(Order::build("bre", UnitType::Fleet)));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(parse_order(""), Err(ParseError::Empty));
        assert_eq!(
            parse_order("par jump bur"),
            Err(ParseError::UnknownVerb("jump".into()))
        );
        assert_eq!(
            parse_order("par -"),
            Err(ParseError::UnexpectedEnd("destination"))
        );
        assert_eq!(
            parse_order("par Build tank"),
            Err(ParseError::UnknownUnitType("tank".into()))
        );
        assert_eq!(parse_order("par Build"), Err(ParseError::UnexpectedEnd("unit type")));
        assert!(matches!(
            parse_order("par H now"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn variant_parser_restricts_kinds_and_units() {
        let g = graph();
        let parser = OrderParser::new(
            &[OrderKind::Hold, OrderKind::Move, OrderKind::Build],
            &[UnitType::Army],
        );
        assert_eq!(parser.parse(&g, "par - bur"), Ok(Order::move_to("par", "bur")));
        assert_eq!(
            parser.parse(&g, "par - bur via convoy"),
            Err(ParseError::UnsupportedKind(OrderKind::MoveViaConvoy))
        );
        assert_eq!(
            parser.parse(&g, "stp/nc Build Fleet"),
            Err(ParseError::UnsupportedUnitType(UnitType::Fleet))
        );
        assert_eq!(
            parser.parse(&g, "par - mos"),
            Err(ParseError::UnknownProvince("mos".into()))
        );
    }

    #[test]
    fn build_anywhere_parser() {
        let parser = OrderParser::default().with_build_anywhere(true);
        assert_eq!(
            parser.parse(&graph(), "par B A"),
            Ok(Order::BuildAnywhere {
                at: "par".into(),
                unit_type: UnitType::Army
            })
        );
    }

    #[test]
    fn submission_groups_by_nation() {
        let g = graph();
        let mut submission = Submission::new();
        submission
            .entry("France".into())
            .or_default()
            .insert("par".into(), strings(&["Move", "bur"]));
        submission
            .entry("Russia".into())
            .or_default()
            .insert("stp/nc".into(), strings(&["Hold"]));
        let parsed = OrderParser::default().parse_submission(&g, &submission).unwrap();
        assert_eq!(parsed[&Nation::new("France")], vec![Order::move_to("par", "bur")]);
        assert_eq!(parsed[&Nation::new("Russia")], vec![Order::hold("stp/nc")]);

        submission
            .entry("France".into())
            .or_default()
            .insert("bur".into(), strings(&["Fly"]));
        let err = OrderParser::default().parse_submission(&g, &submission).unwrap_err();
        assert!(matches!(err, ParseError::Submission { ref province, .. } if province.as_str() == "bur"));
    }
}
