// mode.rs — Change the enforcement posture.

use eg_guard::Mode;

use super::Session;

pub fn execute(mut session: Session, mode: Mode) -> anyhow::Result<()> {
    let previous = session.engine.state().mode;
    session.engine.set_mode(mode);
    println!("Mode: {} -> {}", previous, mode);
    session.save()
}
