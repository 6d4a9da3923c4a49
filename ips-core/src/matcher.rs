//! The verdict engine: given a packet, the loaded rules, and the rate
//! limiter, decide accept or drop.
//!
//! Grounded on `original_source/src/packets/packet_processor.cpp`'s
//! `packet_processor()` and, for the pure two-pass evaluate-then-fold shape,
//! on `contracts::evaluator::evaluate_input_against_rules` (teacher).
//!
//! Four phases, in order:
//! 1. Rate-limit arming — any rate-limit rule that matches the packet is
//!    probed; tripping it bans the source and returns immediately.
//! 2. Ban enforcement — a banned source is dropped before any ordinary rule
//!    is consulted, unless no rate-limit rule exists in the set at all.
//! 3. Rule walk — ordinary rules are matched in file order; `alert` rules
//!    log and keep walking without touching the running verdict; any other
//!    action overwrites it (last-match-wins).
//! 4. Verdict — no match ever recorded ⇒ accept (default-allow); otherwise
//!    the last recorded action decides.

use crate::expr::MatchValue;
use crate::logger::{format_ban_alert, format_rate_limit_alert, format_rule_alert_detail, format_rule_alert_header};
use crate::logger::Logger;
use crate::model::{PacketView, Rule, RuleAction};
use crate::rate_limit::RateLimiter;

fn rule_matches(rule: &Rule, packet: &PacketView<'_>) -> bool {
    rule.src_ip.matches(MatchValue::Ip(packet.src_ip))
        && rule.dst_ip.matches(MatchValue::Ip(packet.dst_ip))
        && rule.src_port.matches(MatchValue::Port(packet.src_port))
        && rule.dst_port.matches(MatchValue::Port(packet.dst_port))
        && protocol_matches(&rule.protocol, packet.protocol.as_str())
        && rule.string_content.matches(MatchValue::Payload(packet.payload))
}

fn protocol_matches(rule_protocol: &str, packet_protocol: &str) -> bool {
    rule_protocol.eq_ignore_ascii_case("any") || rule_protocol.eq_ignore_ascii_case(packet_protocol)
}

/// Accept (`true`) or drop (`false`) for a terminal rule action. `Alert`
/// never reaches here as the carrying action of a rule-walk verdict (it's
/// handled separately in phase 3), but a rate-limit rule's own `action` can
/// legitimately be `alert` — spec.md leaves that case open, so it defaults
/// to the safe side, accept-and-already-logged.
fn verdict_from_action(action: RuleAction) -> bool {
    match action {
        RuleAction::Drop => false,
        RuleAction::Accept | RuleAction::Alert => true,
    }
}

/// Returns `true` to accept the packet, `false` to drop it.
pub fn decide(packet: &PacketView<'_>, rules: &[Rule], limiter: &RateLimiter, logger: &dyn Logger) -> bool {
    // Phase 1: rate-limit arming.
    for rule in rules {
        if rule.is_rate_limit_rule && rule_matches(rule, packet) {
            if limiter.check_rate_limit(packet.src_ip, rule.max_requests, rule.time_window_seconds) {
                limiter.ban_ip(packet.src_ip, rule.ban_duration_seconds);
                logger.alert(&format_rate_limit_alert(
                    packet.src_ip,
                    rule.max_requests,
                    rule.time_window_seconds,
                    rule.ban_duration_seconds,
                ));
                return verdict_from_action(rule.action);
            }
        }
    }

    // Phase 2: ban enforcement. Only consulted when at least one rate-limit
    // rule exists — an unbanned address is never in the map at all, so this
    // is really just a short-circuit, but the explicit guard mirrors the
    // original's structure and avoids a map probe on rule sets with no
    // rate limiting configured.
    if rules.iter().any(|r| r.is_rate_limit_rule) && limiter.is_banned(packet.src_ip) {
        logger.alert(&format_ban_alert(packet.src_ip));
        return false;
    }

    // Phase 3: rule walk.
    let mut last_action: Option<RuleAction> = None;
    let mut last_rule: Option<&Rule> = None;

    for rule in rules {
        if !rule_matches(rule, packet) {
            continue;
        }
        if rule.action == RuleAction::Alert {
            logger.alert(&format_rule_alert_header(
                packet.src_ip,
                packet.src_port,
                packet.dst_ip,
                packet.dst_port,
                packet.protocol.as_str(),
            ));
            logger.write_raw(&format_rule_alert_detail(&rule.description, rule.rule_id));
            continue;
        }
        last_action = Some(rule.action);
        last_rule = Some(rule);
    }

    if let Some(rule) = last_rule {
        logger.verbose(&format!(
            "Final verdict driven by rule \"{}\" (ID: {})",
            rule.description, rule.rule_id
        ));
    }

    // Phase 4: verdict.
    match last_action {
        None => true,
        Some(action) => verdict_from_action(action),
    }
}
