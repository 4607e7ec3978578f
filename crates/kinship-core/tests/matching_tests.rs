/// Cross-tree identity signals and scoring
use chrono::NaiveDate;
use kinship_core::matching::{build_index_entry, confidence_score, CandidateFilter, MatchPolicy};
use kinship_core::{Gender, Member, NewMember};

fn member(id: &str, tree: &str, name: &str, year: Option<i32>) -> Member {
    let mut profile = NewMember::new(name, Gender::Male);
    if let Some(y) = year {
        profile = profile.born(NaiveDate::from_ymd_opt(y, 3, 1).unwrap());
    }
    Member::new(id.to_string(), tree.to_string(), profile, 0)
}

#[test]
fn test_john_smith_scenario_scores_one() {
    let policy = MatchPolicy::default();
    let a = build_index_entry(&member("a", "t1", "John Smith", Some(1950)), "u1");
    let b = build_index_entry(&member("b", "t2", "  john   smith", Some(1951)), "u2");

    let filter = CandidateFilter::for_subject(&a, &policy);
    assert!(filter.accepts(&b));

    let score = confidence_score(&a, &b, &policy);
    assert!((score - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_score_is_symmetric_and_bounded() {
    let policy = MatchPolicy::default();
    let years = [None, Some(1900), Some(1901), Some(1903), Some(1910)];
    for ya in years {
        for yb in years {
            let a = build_index_entry(&member("a", "t1", "Ann Lee", ya), "u1");
            let b = build_index_entry(&member("b", "t2", "Ann Lee", yb), "u2");
            let ab = confidence_score(&a, &b, &policy);
            let ba = confidence_score(&b, &a, &policy);
            assert!((ab - ba).abs() < f64::EPSILON);
            assert!((0.0..=1.0).contains(&ab));
        }
    }
}

#[test]
fn test_wider_policy_window() {
    let policy = MatchPolicy {
        birth_year_window: 10,
        close_birth_year_window: 5,
    };
    let a = build_index_entry(&member("a", "t1", "Ann Lee", Some(1900)), "u1");
    let b = build_index_entry(&member("b", "t2", "Ann Lee", Some(1908)), "u2");

    assert!(CandidateFilter::for_subject(&a, &policy).accepts(&b));
    assert!(!CandidateFilter::for_subject(&a, &MatchPolicy::default()).accepts(&b));
    assert!((confidence_score(&a, &b, &policy) - 0.8).abs() < 1e-9);
}
