//! Turns a rules JSON file into a validated, compiled `Vec<Rule>`.
//!
//! Grounded on `original_source/rules/parser.cpp` for field names and
//! validation order, and on `contracts::evaluator::LoadError` (teacher) for
//! the shape of the error enum — a typed, non-fatal-at-the-library-boundary
//! error the caller decides how to react to, rather than a silently-empty
//! `Vec`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::expr::CompiledExpression;
use crate::logger::Logger;
use crate::model::{Rule, RuleAction};

#[derive(Debug, thiserror::Error)]
pub enum RuleLoadError {
    #[error("cannot read rules file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rules JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rules file must contain a JSON array of rule objects")]
    NotArray,
    #[error("rule entry is not a JSON object")]
    NotObject,
    #[error("rule_id is required")]
    MissingId,
    #[error("duplicate rule id: {0}")]
    DuplicateId(i64),
    #[error("action is required")]
    MissingAction,
    #[error("action must be \"drop\", \"alert\", or \"accept\", got {0:?}")]
    InvalidAction(String),
    #[error("rule {0}: either src_ip or dst_ip is required")]
    MissingAddress(i64),
    #[error(
        "rate-limit rule {0} must have positive max_requests, time_window_seconds, and ban_duration_seconds"
    )]
    NonPositiveRateLimit(i64),
}

const KNOWN_FIELDS: &[&str] = &[
    "rule_id",
    "description",
    "src_ip",
    "dst_ip",
    "src_port",
    "dst_port",
    "protocol",
    "action",
    "string",
    "is_rate_limit_rule",
    "max_requests",
    "time_window_seconds",
    "ban_duration_seconds",
];

fn warn_unknown_fields(
    obj: &serde_json::Map<String, Value>,
    description: &str,
    rule_id_display: &str,
    logger: &dyn Logger,
) {
    for key in obj.keys() {
        if !KNOWN_FIELDS.contains(&key.as_str()) {
            logger.warn(&format!(
                "Unknown field \"{key}\" in rule \"{description}\" (ID: {rule_id_display}) ignored"
            ));
        }
    }
}

/// Parses, validates, and compiles every rule in `path`.
///
/// Any validation failure aborts the whole load and returns the
/// corresponding `RuleLoadError` after logging it through `logger` —
/// callers that want spec.md's "treat a bad rules file as zero rules"
/// behavior can map `Err(_)` to an empty `Vec` themselves.
pub fn parse_all_rules(path: &Path, logger: &dyn Logger) -> Result<Vec<Rule>, RuleLoadError> {
    logger.info(&format!("Processing rules from \"{}\" next:", path.display()));

    let text = fs::read_to_string(path).map_err(|e| {
        logger.error(&format!("Cannot read rules file \"{}\": {e}", path.display()));
        RuleLoadError::Io(e)
    })?;

    let root: Value = serde_json::from_str(&text).map_err(|e| {
        logger.error(&format!("Invalid rules JSON in \"{}\": {e}", path.display()));
        RuleLoadError::Json(e)
    })?;

    let items = root.as_array().ok_or_else(|| {
        logger.error("Rules file must contain a JSON array of rule objects");
        RuleLoadError::NotArray
    })?;

    let mut rules = Vec::with_capacity(items.len());
    let mut seen_ids: HashSet<i64> = HashSet::new();

    for item in items {
        let obj = item.as_object().ok_or_else(|| {
            logger.error("Rule entry is not a JSON object");
            RuleLoadError::NotObject
        })?;

        let description = obj.get("description").and_then(Value::as_str).unwrap_or("unknown").to_string();
        let rule_id_display = obj
            .get("rule_id")
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        logger.verbose(&format!("Processing rule \"{description}\" (ID: {rule_id_display})"));

        warn_unknown_fields(obj, &description, &rule_id_display, logger);

        let rule_id = obj.get("rule_id").and_then(Value::as_i64).ok_or_else(|| {
            logger.error(&format!("Rule \"{description}\" is missing rule_id"));
            RuleLoadError::MissingId
        })?;

        if !seen_ids.insert(rule_id) {
            logger.error(&format!("Duplicate rule id: {rule_id}"));
            return Err(RuleLoadError::DuplicateId(rule_id));
        }

        let action_str = match obj.get("action").and_then(Value::as_str) {
            Some(s) => s,
            None => {
                logger.error(&format!("Rule {rule_id} (\"{description}\") is missing action"));
                return Err(RuleLoadError::MissingAction);
            }
        };
        let action = RuleAction::parse(action_str).ok_or_else(|| {
            logger.error(&format!(
                "Rule {rule_id} (\"{description}\") has invalid action {action_str:?}"
            ));
            RuleLoadError::InvalidAction(action_str.to_string())
        })?;

        let src_ip = obj.get("src_ip").and_then(Value::as_str);
        let dst_ip = obj.get("dst_ip").and_then(Value::as_str);
        if src_ip.is_none() && dst_ip.is_none() {
            logger.error(&format!(
                "Rule {rule_id} (\"{description}\") needs at least one of src_ip, dst_ip"
            ));
            return Err(RuleLoadError::MissingAddress(rule_id));
        }

        let src_ip_expr = src_ip.unwrap_or("any");
        let dst_ip_expr = dst_ip.unwrap_or("any");
        let src_port_expr = obj.get("src_port").and_then(Value::as_str).unwrap_or("any");
        let dst_port_expr = obj.get("dst_port").and_then(Value::as_str).unwrap_or("any");
        let protocol = obj.get("protocol").and_then(Value::as_str).unwrap_or("any").to_string();
        let string_expr = obj.get("string").and_then(Value::as_str).unwrap_or("");

        let is_rate_limit_rule = obj.get("is_rate_limit_rule").and_then(Value::as_bool).unwrap_or(false);
        let max_requests = obj.get("max_requests").and_then(Value::as_i64).unwrap_or(0);
        let time_window_seconds = obj.get("time_window_seconds").and_then(Value::as_i64).unwrap_or(0);
        let ban_duration_seconds = obj.get("ban_duration_seconds").and_then(Value::as_i64).unwrap_or(0);

        if is_rate_limit_rule && (max_requests <= 0 || time_window_seconds <= 0 || ban_duration_seconds <= 0) {
            logger.error(&format!(
                "Rate-limit rule {rule_id} (\"{description}\") needs positive max_requests, time_window_seconds, and ban_duration_seconds"
            ));
            return Err(RuleLoadError::NonPositiveRateLimit(rule_id));
        }

        rules.push(Rule {
            rule_id,
            description,
            action,
            src_ip: CompiledExpression::compile(src_ip_expr),
            dst_ip: CompiledExpression::compile(dst_ip_expr),
            src_port: CompiledExpression::compile(src_port_expr),
            dst_port: CompiledExpression::compile(dst_port_expr),
            protocol,
            string_content: CompiledExpression::compile(string_expr),
            is_rate_limit_rule,
            max_requests,
            time_window_seconds,
            ban_duration_seconds,
        });
    }

    logger.info(&format!("All rules OK. Loaded {} rules", rules.len()));
    Ok(rules)
}
