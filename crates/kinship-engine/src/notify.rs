//! Notification seam for newly created matches
//!
//! The matching job builds a `MatchNotice` after a record is committed and
//! hands it to a `NotificationDispatcher`. Dispatch errors are logged by the
//! caller and never undo the match.

use kinship_core::model::{MatchRecord, User};
use kinship_store::Result;

/// Everything a dispatcher needs to tell both owners about a match
#[derive(Debug, Clone)]
pub struct MatchNotice {
    pub record: MatchRecord,
    /// Owner of `record.member_a_id`
    pub user_a: User,
    /// Owner of `record.member_b_id`
    pub user_b: User,
    pub member_a_name: String,
    pub member_b_name: String,
}

impl MatchNotice {
    /// One-line summary addressed to the owner of `member_a`
    pub fn summary_for_a(&self) -> String {
        format!(
            "Hello {}, \"{}\" in your tree may be the same person as \"{}\" in {}'s tree ({:.0}% confidence).",
            self.user_a.display_name(),
            self.member_a_name,
            self.member_b_name,
            self.user_b.display_name(),
            self.record.confidence_score * 100.0
        )
    }

    /// One-line summary addressed to the owner of `member_b`
    pub fn summary_for_b(&self) -> String {
        format!(
            "Hello {}, \"{}\" in your tree may be the same person as \"{}\" in {}'s tree ({:.0}% confidence).",
            self.user_b.display_name(),
            self.member_b_name,
            self.member_a_name,
            self.user_a.display_name(),
            self.record.confidence_score * 100.0
        )
    }
}

/// Delivers match notices (e-mail, push, ...)
pub trait NotificationDispatcher: Send + Sync {
    /// Deliver a notice to both owners
    ///
    /// # Errors
    ///
    /// Returns `ExternalService` when delivery fails.
    fn notify_match(&self, notice: &MatchNotice) -> Result<()>;
}

/// Dispatcher that only logs the notice
///
/// E-mail addresses stay redacted in the log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationDispatcher for TracingNotifier {
    fn notify_match(&self, notice: &MatchNotice) -> Result<()> {
        for (owner, summary) in [
            (&notice.user_a, notice.summary_for_a()),
            (&notice.user_b, notice.summary_for_b()),
        ] {
            tracing::info!(
                match_id = %notice.record.id,
                recipient = %owner.id,
                email = %owner.email,
                confidence = notice.record.confidence_score,
                "{}",
                summary
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinship_core::logging_facility::init_test_capture;
    use kinship_core::model::MatchIndexEntry;

    fn notice() -> MatchNotice {
        let entry = |member: &str, tree: &str| MatchIndexEntry {
            member_id: member.to_string(),
            user_id: String::new(),
            tree_id: tree.to_string(),
            normalized_name: "john smith".to_string(),
            generation_level: 0,
            birth_year_approx: None,
            location: None,
        };
        MatchNotice {
            record: MatchRecord::new("r".to_string(), &entry("a", "t1"), &entry("b", "t2"), 0.8),
            user_a: User::new("u1".to_string(), Some("Ann".to_string()), "ann@x.org".to_string()),
            user_b: User::new("u2".to_string(), None, "bob@x.org".to_string()),
            member_a_name: "John Smith".to_string(),
            member_b_name: "John  Smith".to_string(),
        }
    }

    #[test]
    fn test_summaries_address_each_owner() {
        let n = notice();
        assert!(n.summary_for_a().starts_with("Hello Ann"));
        assert!(n.summary_for_a().contains("80%"));
        assert!(n.summary_for_b().starts_with("Hello User"));
    }

    #[test]
    fn test_notice_debug_redacts_email() {
        let rendered = format!("{:?}", notice());
        assert!(!rendered.contains("ann@x.org"));
    }

    #[test]
    fn test_tracing_notifier_addresses_both_owners() {
        let capture = init_test_capture();
        let n = notice();
        let match_id = format!("notify-{}", uuid::Uuid::now_v7());
        let n = MatchNotice {
            record: MatchRecord {
                id: match_id.clone(),
                ..n.record.clone()
            },
            ..n
        };

        assert!(TracingNotifier.notify_match(&n).is_ok());

        let mut recipients: Vec<String> = capture
            .events()
            .into_iter()
            .filter(|e| e.field("match_id") == Some(match_id.as_str()))
            .filter_map(|e| e.field("recipient").map(str::to_string))
            .collect();
        recipients.sort();
        assert_eq!(recipients, vec!["u1".to_string(), "u2".to_string()]);

        let messages: Vec<String> = capture
            .events()
            .into_iter()
            .filter(|e| e.field("match_id") == Some(match_id.as_str()))
            .filter_map(|e| e.field("message").map(str::to_string))
            .collect();
        assert!(messages.iter().any(|m| m.starts_with("Hello Ann")));
        assert!(messages.iter().any(|m| m.starts_with("Hello User")));
        assert!(messages.iter().all(|m| !m.contains("@x.org")));
    }
}
