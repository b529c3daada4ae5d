//! Button press handling for flagged submissions

use crate::application::commands::flag::{APPROVE_PREFIX, REJECT_PREFIX};
use crate::domain::entities::Reply;

/// Decision encoded in a review button's custom id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve(String),
    Reject(String),
}

impl ReviewDecision {
    /// Parse `approve_<id>` / `reject_<id>`. The id may itself contain underscores.
    pub fn parse(custom_id: &str) -> Option<Self> {
        if let Some(id) = custom_id.strip_prefix(APPROVE_PREFIX) {
            return (!id.is_empty()).then(|| ReviewDecision::Approve(id.to_string()));
        }
        if let Some(id) = custom_id.strip_prefix(REJECT_PREFIX) {
            return (!id.is_empty()).then(|| ReviewDecision::Reject(id.to_string()));
        }
        None
    }

    /// Replacement for the review card: text only, embeds and buttons cleared.
    pub fn outcome(&self) -> Reply {
        match self {
            ReviewDecision::Approve(id) => Reply::public(format!("✅ Submission {id} approved.")),
            ReviewDecision::Reject(id) => Reply::public(format!("❌ Submission {id} rejected.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_review_buttons() {
        assert_eq!(
            ReviewDecision::parse("approve_42"),
            Some(ReviewDecision::Approve("42".into()))
        );
        assert_eq!(
            ReviewDecision::parse("reject_sub_7"),
            Some(ReviewDecision::Reject("sub_7".into()))
        );
        assert_eq!(ReviewDecision::parse("approve_"), None);
        assert_eq!(ReviewDecision::parse("delete_42"), None);
    }

    #[test]
    fn outcome_clears_the_card() {
        let reply = ReviewDecision::Reject("42".into()).outcome();
        assert_eq!(reply.content.as_deref(), Some("❌ Submission 42 rejected."));
        assert!(reply.embeds.is_empty());
        assert!(reply.buttons.is_empty());
    }
}
