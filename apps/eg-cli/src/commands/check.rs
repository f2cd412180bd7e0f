// check.rs — Gate one operation and report the verdict.
//
// Exit code 0 means proceed, 2 means blocked, so shell hooks can gate on
// the guard directly:
//
//   eg check web_fetch url=https://example.com && run_the_fetch

use serde_json::Value;

use eg_constraint::OperationContext;
use eg_guard::OperationRequest;

use super::Session;

pub fn execute(mut session: Session, operation: &str, pairs: &[String]) -> anyhow::Result<()> {
    let context = parse_context(pairs)?;
    let request = OperationRequest::new(operation).with_context(context);
    let decision = session.engine.evaluate(&request);

    let verdict = if decision.allow { "ALLOW" } else { "BLOCK" };
    println!(
        "{} {} [{}] cost {:.2}",
        verdict, operation, decision.risk, decision.cost
    );
    for reason in &decision.reasons {
        println!("  - {}", reason);
    }
    if decision.advisory && decision.would_block {
        println!("  (shadow mode: would have blocked)");
    }

    session.save()?;
    if !decision.allow {
        std::process::exit(2);
    }
    Ok(())
}

/// Parse `key=value` pairs into a context. Values that parse as JSON are
/// kept typed (`true`, `3`, `["a","b"]`); everything else is a string.
fn parse_context(pairs: &[String]) -> anyhow::Result<OperationContext> {
    let mut context = OperationContext::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("expected key=value, got '{}'", pair))?;
        let value = serde_json::from_str::<Value>(raw)
            .unwrap_or_else(|_| Value::String(raw.to_string()));
        context = context.with(key, value);
    }
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_parse_with_json_typing() {
        let ctx = parse_context(&[
            "is_external=true".to_string(),
            "path=/data/users.csv".to_string(),
            "count=3".to_string(),
        ])
        .unwrap();
        assert!(ctx.flag("is_external"));
        assert_eq!(ctx.text("path"), Some("/data/users.csv"));
        assert_eq!(ctx.get("count"), Some(&Value::from(3)));
    }

    #[test]
    fn malformed_pair_is_rejected() {
        assert!(parse_context(&["no_equals_sign".to_string()]).is_err());
    }

    #[test]
    fn value_may_contain_equals() {
        let ctx = parse_context(&["url=https://example.com?a=b".to_string()]).unwrap();
        assert_eq!(ctx.text("url"), Some("https://example.com?a=b"));
    }
}
