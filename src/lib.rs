//! Discord bot for the league: slash commands, review buttons and
//! scheduled announcements, backed by the league REST API.

pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod testing;
