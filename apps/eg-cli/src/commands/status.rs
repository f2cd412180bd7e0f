// status.rs — Show the session summary.

use super::Session;

pub fn execute(session: Session) -> anyhow::Result<()> {
    println!("{}", session.engine.explain());
    // Read-only: no state save.
    Ok(())
}
