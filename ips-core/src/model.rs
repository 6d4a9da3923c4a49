//! Rule, packet, and protocol/action types shared by the loader and matcher.

use crate::expr::CompiledExpression;

/// Transport protocol tag carried by both rules and packets.
///
/// Rules additionally accept the literal string `"any"`/`"ANY"`, which is
/// not a variant here — it is handled as a wildcard comparison in
/// [`crate::matcher::protocol_matches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Any,
    Tcp,
    Udp,
}

impl Protocol {
    /// Maps an IPv4 header protocol number to a tag. Anything other than
    /// TCP (6) or UDP (17) collapses to `Any` — this core only reasons
    /// about the two transports the rule language names.
    pub fn from_number(n: u8) -> Self {
        match n {
            6 => Protocol::Tcp,
            17 => Protocol::Udp,
            _ => Protocol::Any,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Any => "ANY",
        }
    }
}

/// The action a matched rule produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    Drop,
    Accept,
    Alert,
}

impl RuleAction {
    /// Case-insensitive parse of the three values the loader accepts.
    /// Anything else is not a valid action — `None` signals the caller
    /// should reject the rule.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("drop") {
            Some(RuleAction::Drop)
        } else if s.eq_ignore_ascii_case("accept") {
            Some(RuleAction::Accept)
        } else if s.eq_ignore_ascii_case("alert") {
            Some(RuleAction::Alert)
        } else {
            None
        }
    }
}

/// A single loaded and compiled rule.
///
/// The address/port/payload fields are boolean expressions compiled once at
/// load time (see `CompiledExpression`); `protocol` stays a raw string since
/// its only comparison is "any" or an exact case-insensitive match, not a
/// boolean expression.
#[derive(Debug)]
pub struct Rule {
    pub rule_id: i64,
    pub description: String,
    pub action: RuleAction,
    pub src_ip: CompiledExpression,
    pub dst_ip: CompiledExpression,
    pub src_port: CompiledExpression,
    pub dst_port: CompiledExpression,
    pub protocol: String,
    pub string_content: CompiledExpression,
    pub is_rate_limit_rule: bool,
    pub max_requests: i64,
    pub time_window_seconds: i64,
    pub ban_duration_seconds: i64,
}

/// A borrowed view of one packet's fields, built by whatever feeds the
/// matcher (an NFQUEUE adapter in production, `JsonlPacketSource` here).
/// Never retained past a single `decide()` call.
#[derive(Debug, Clone, Copy)]
pub struct PacketView<'a> {
    pub src_ip: &'a str,
    pub dst_ip: &'a str,
    pub src_port: u16,
    pub dst_port: u16,
    pub protocol: Protocol,
    pub payload: &'a [u8],
}
