//! Slash command definitions

pub mod broadcast;
pub mod flag;
pub mod pingmissing;
pub mod roster;

use crate::application::errors::CommandError;
use crate::domain::entities::CommandRegistry;

/// Registry holding every command the bot serves.
pub fn default_registry() -> Result<CommandRegistry, CommandError> {
    let mut registry = CommandRegistry::new();
    registry.register(broadcast::command())?;
    registry.register(flag::command())?;
    registry.register(pingmissing::command())?;
    registry.register(roster::command())?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_all_commands() {
        let registry = default_registry().unwrap();
        let names: Vec<_> = registry.all().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["broadcast", "flag", "pingmissing", "roster"]);
        assert!(registry.all().all(|c| !c.description.is_empty()));
    }
}
