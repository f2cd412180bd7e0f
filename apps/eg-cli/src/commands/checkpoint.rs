// checkpoint.rs — Record a human interaction.

use super::Session;

pub fn execute(mut session: Session) -> anyhow::Result<()> {
    session.engine.human_interaction();
    let state = session.engine.state();
    println!(
        "Checkpoint recorded. Trust {:.2}, budget {:.2}/{:.2}.",
        state.trust.score(),
        state.budget.remaining(),
        state.budget.size()
    );
    session.save()
}
