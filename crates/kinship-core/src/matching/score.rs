use crate::model::MatchIndexEntry;

const BASE_SCORE: f64 = 0.5;
const NAME_BONUS: f64 = 0.3;
const BIRTH_YEAR_BONUS: f64 = 0.2;

/// Tunable windows for candidate search and scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    /// Candidates must be born within this many years of the subject
    pub birth_year_window: i32,
    /// Birth years this close earn the birth-year bonus
    pub close_birth_year_window: i32,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            birth_year_window: 5,
            close_birth_year_window: 2,
        }
    }
}

/// Search criteria derived from the member being indexed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFilter {
    pub member_id: String,
    /// Entries owned by this user are never candidates
    pub exclude_user_id: String,
    pub normalized_name: String,
    /// Inclusive birth-year range; `None` when the subject's year is unknown
    pub birth_year_range: Option<(i32, i32)>,
}

impl CandidateFilter {
    pub fn for_subject(subject: &MatchIndexEntry, policy: &MatchPolicy) -> Self {
        Self {
            member_id: subject.member_id.clone(),
            exclude_user_id: subject.user_id.clone(),
            normalized_name: subject.normalized_name.clone(),
            birth_year_range: subject.birth_year_approx.map(|year| {
                (
                    year.saturating_sub(policy.birth_year_window),
                    year.saturating_add(policy.birth_year_window),
                )
            }),
        }
    }

    /// In-memory form of the candidate query
    ///
    /// With a birth-year range, entries lacking a year are excluded.
    pub fn accepts(&self, entry: &MatchIndexEntry) -> bool {
        if entry.member_id == self.member_id
            || entry.user_id == self.exclude_user_id
            || entry.normalized_name != self.normalized_name
        {
            return false;
        }
        match (self.birth_year_range, entry.birth_year_approx) {
            (None, _) => true,
            (Some((lo, hi)), Some(year)) => (lo..=hi).contains(&year),
            (Some(_), None) => false,
        }
    }
}

/// Confidence that two index entries describe the same person, in [0, 1]
pub fn confidence_score(
    subject: &MatchIndexEntry,
    candidate: &MatchIndexEntry,
    policy: &MatchPolicy,
) -> f64 {
    let mut score = BASE_SCORE;

    if subject.normalized_name == candidate.normalized_name {
        score += NAME_BONUS;
    }

    if let (Some(a), Some(b)) = (subject.birth_year_approx, candidate.birth_year_approx) {
        if a.abs_diff(b) <= policy.close_birth_year_window.unsigned_abs() {
            score += BIRTH_YEAR_BONUS;
        }
    }

    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(member_id: &str, user_id: &str, name: &str, year: Option<i32>) -> MatchIndexEntry {
        MatchIndexEntry {
            member_id: member_id.to_string(),
            user_id: user_id.to_string(),
            tree_id: format!("tree-{}", user_id),
            normalized_name: name.to_string(),
            generation_level: 0,
            birth_year_approx: year,
            location: None,
        }
    }

    #[test]
    fn test_full_score_for_close_birth_years() {
        let a = entry("a", "u1", "john smith", Some(1950));
        let b = entry("b", "u2", "john smith", Some(1951));
        let score = confidence_score(&a, &b, &MatchPolicy::default());
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_name_only_score() {
        let a = entry("a", "u1", "john smith", Some(1950));
        let b = entry("b", "u2", "john smith", Some(1954));
        let score = confidence_score(&a, &b, &MatchPolicy::default());
        assert!((score - 0.8).abs() < 1e-9);

        let undated = entry("c", "u2", "john smith", None);
        let score = confidence_score(&a, &undated, &MatchPolicy::default());
        assert!((score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_filter_rejects_same_user_and_other_names() {
        let subject = entry("a", "u1", "john smith", Some(1950));
        let filter = CandidateFilter::for_subject(&subject, &MatchPolicy::default());

        assert!(!filter.accepts(&entry("b", "u1", "john smith", Some(1950))));
        assert!(!filter.accepts(&entry("c", "u2", "jon smith", Some(1950))));
        assert!(filter.accepts(&entry("d", "u2", "john smith", Some(1955))));
        assert!(!filter.accepts(&entry("e", "u2", "john smith", Some(1956))));
        assert!(!filter.accepts(&entry("f", "u2", "john smith", None)));
    }

    #[test]
    fn test_undated_subject_matches_on_name_only() {
        let subject = entry("a", "u1", "john smith", None);
        let filter = CandidateFilter::for_subject(&subject, &MatchPolicy::default());
        assert_eq!(filter.birth_year_range, None);
        assert!(filter.accepts(&entry("b", "u2", "john smith", None)));
        assert!(filter.accepts(&entry("c", "u2", "john smith", Some(1800))));
    }

    #[test]
    fn test_huge_window_saturates() {
        let subject = entry("a", "u1", "john smith", Some(1950));
        let policy = MatchPolicy {
            birth_year_window: i32::MAX,
            close_birth_year_window: i32::MAX,
        };
        let filter = CandidateFilter::for_subject(&subject, &policy);
        assert_eq!(filter.birth_year_range, Some((1950 - i32::MAX, i32::MAX)));
        assert!(filter.accepts(&entry("b", "u2", "john smith", Some(-1_000_000_000))));
        assert_eq!(
            confidence_score(&subject, &entry("c", "u2", "john smith", Some(-1_000_000_000)), &policy),
            1.0
        );
    }
}
