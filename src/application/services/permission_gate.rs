//! Permission checks for privileged commands

use crate::application::errors::CommandError;
use crate::domain::entities::{Invocation, Permissions};

/// True when the invoker holds `required`. Administrator implies every flag.
pub fn has_permission(invocation: &Invocation, required: Permissions) -> bool {
    invocation.permissions.contains(Permissions::ADMINISTRATOR)
        || invocation.permissions.contains(required)
}

pub fn require(invocation: &Invocation, required: Permissions) -> Result<(), CommandError> {
    if has_permission(invocation, required) {
        Ok(())
    } else {
        Err(CommandError::PermissionDenied(format!(
            "{} lacks {:?} for /{}",
            invocation.user.id, required, invocation.command
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::User;

    fn invocation(perms: Permissions) -> Invocation {
        Invocation::new("broadcast", User::new("7", "someone"), "chan").with_permissions(perms)
    }

    #[test]
    fn empty_flags_are_denied() {
        let inv = invocation(Permissions::empty());
        assert!(!has_permission(&inv, Permissions::ADMINISTRATOR));
        assert!(matches!(
            require(&inv, Permissions::MANAGE_MESSAGES),
            Err(CommandError::PermissionDenied(_))
        ));
    }

    #[test]
    fn administrator_implies_everything() {
        let inv = invocation(Permissions::ADMINISTRATOR);
        assert!(has_permission(&inv, Permissions::MANAGE_GUILD));
        assert!(has_permission(&inv, Permissions::ADMINISTRATOR));
    }

    #[test]
    fn unrelated_flags_do_not_grant_admin() {
        let inv = invocation(Permissions::MANAGE_MESSAGES | Permissions::SEND_MESSAGES);
        assert!(has_permission(&inv, Permissions::MANAGE_MESSAGES));
        assert!(!has_permission(&inv, Permissions::ADMINISTRATOR));
    }
}
