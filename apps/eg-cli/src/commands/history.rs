// history.rs — Show recent decisions from the session ring buffer.

use super::Session;

pub fn execute(session: Session, n: usize) -> anyhow::Result<()> {
    let history = &session.engine.state().history;
    if history.is_empty() {
        println!("No decisions recorded.");
        return Ok(());
    }
    for entry in history.recent(n) {
        let verdict = if entry.blocked { "BLOCK" } else { "allow" };
        let resource = entry.resource.as_deref().unwrap_or("-");
        println!(
            "{}  {:5}  [{:8}]  {}  {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            verdict,
            entry.risk.to_string(),
            entry.operation,
            resource
        );
    }
    Ok(())
}
