//! Message parser - Turns typed command lines into invocations

use crate::domain::entities::{Invocation, Permissions, User};

/// Parses `/name key:value key:value` lines, as typed in the console adapter.
///
/// A value runs until the next `key:` token, so values may contain spaces.
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    /// Parse a line; `None` when it is not a command.
    pub fn parse(&self, text: &str, user: User, permissions: Permissions, channel_id: &str) -> Option<Invocation> {
        let body = text.trim().strip_prefix(&self.command_prefix)?;
        let mut tokens = body.split_whitespace();
        let name = tokens.next()?;

        let mut invocation = Invocation::new(name, user, channel_id).with_permissions(permissions);
        let mut current: Option<(String, Vec<&str>)> = None;

        for token in tokens {
            match split_option(token) {
                Some((key, value)) => {
                    if let Some((k, words)) = current.take() {
                        invocation = invocation.with_option(k, words.join(" "));
                    }
                    let words = if value.is_empty() { Vec::new() } else { vec![value] };
                    current = Some((key.to_string(), words));
                }
                None => {
                    if let Some((_, words)) = current.as_mut() {
                        words.push(token);
                    }
                }
            }
        }
        if let Some((k, words)) = current {
            invocation = invocation.with_option(k, words.join(" "));
        }

        Some(invocation)
    }
}

fn split_option(token: &str) -> Option<(&str, &str)> {
    let (key, value) = token.split_once(':')?;
    let starts_with_letter = key.chars().next().is_some_and(|c| c.is_ascii_lowercase());
    let valid = starts_with_letter
        && key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !value.starts_with('/');
    valid.then_some((key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Option<Invocation> {
        MessageParser::new("/").parse(line, User::new("0", "console"), Permissions::ADMINISTRATOR, "console")
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert!(parse("hello there").is_none());
        assert!(parse("/").is_none());
    }

    #[test]
    fn values_may_span_words() {
        let inv = parse("/broadcast message:Finals tonight at 8 sharp").unwrap();
        assert_eq!(inv.command, "broadcast");
        assert_eq!(inv.option("message"), Some("Finals tonight at 8 sharp"));
        assert!(inv.permissions.contains(Permissions::ADMINISTRATOR));
    }

    #[test]
    fn multiple_options_keep_order() {
        let inv = parse("/roster team_name:Night Owls extra:1").unwrap();
        assert_eq!(
            inv.options,
            vec![
                ("team_name".to_string(), "Night Owls".to_string()),
                ("extra".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn colons_inside_values_are_kept() {
        let inv = parse("/broadcast message:Starts https://example.com/x at 8:00").unwrap();
        assert_eq!(inv.option("message"), Some("Starts https://example.com/x at 8:00"));
    }
}
