//! Property-based tests for identity normalization and aggregation.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::aggregate::aggregate;
    use crate::collector::CollectionResult;
    use crate::identity::{IdentityKey, RawCommit};
    use crate::repo::RepoIdentifier;
    use crate::rules::{InclusionRules, RuleInputs};
    use crate::source::{SourceSpec, SourceType};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn email_strategy() -> impl Strategy<Value = String> {
        ("[a-z][a-z0-9.]{0,8}", "[a-z]{1,8}\\.(com|org|io)").prop_map(|(l, d)| format!("{}@{}", l, d))
    }

    fn commit_strategy() -> impl Strategy<Value = RawCommit> {
        (
            "[A-Za-z ]{1,12}",
            prop::option::of(email_strategy()),
            0i64..2_000_000_000_000,
        )
            .prop_map(|(name, email, ts)| RawCommit::new(&name, email.as_deref(), ts))
    }

    fn results_strategy() -> impl Strategy<Value = Vec<CollectionResult>> {
        prop::collection::vec(
            ("[a-z]{1,6}", prop::collection::vec(commit_strategy(), 0..6)),
            0..6,
        )
        .prop_map(|repos| {
            repos
                .into_iter()
                .map(|(name, commits)| {
                    CollectionResult::commits(
                        RepoIdentifier::new(SourceType::Bitbucket, "ws", None, &name),
                        commits,
                    )
                })
                .collect()
        })
    }

    // ============================================================================
    // IdentityKey property tests
    // ============================================================================

    proptest! {
        /// Property: email case and surrounding whitespace never change the key
        #[test]
        fn email_key_ignores_case_and_whitespace(
            email in email_strategy(),
            pad_left in " {0,3}",
            pad_right in " {0,3}",
        ) {
            let lower = IdentityKey::derive("anyone", Some(&email));
            let padded = format!("{}{}{}", pad_left, email.to_uppercase(), pad_right);
            let shouted = IdentityKey::derive("Someone Else", Some(&padded));
            prop_assert_eq!(lower, shouted);
        }

        /// Property: a valid email always wins over the name
        #[test]
        fn valid_email_produces_email_key(name in ".{0,20}", email in email_strategy()) {
            let key = IdentityKey::derive(&name, Some(&email));
            prop_assert!(matches!(key, IdentityKey::Email(_)));
        }

        /// Property: derived keys never carry surrounding whitespace or upper case
        #[test]
        fn derived_key_is_normalized(name in "[A-Za-z ]{0,20}", email in prop::option::of("[ A-Za-z@.]{0,20}")) {
            let key = IdentityKey::derive(&name, email.as_deref());
            let text = key.as_str();
            prop_assert_eq!(text, text.trim());
            prop_assert_eq!(text.to_string(), text.to_lowercase());
        }
    }

    // ============================================================================
    // aggregate property tests
    // ============================================================================

    proptest! {
        /// Property: the report does not depend on the order results arrive in
        #[test]
        fn aggregate_is_order_independent(
            (results, shuffled) in results_strategy().prop_flat_map(|r| {
                let original = Just(r.clone());
                (original, Just(r).prop_shuffle())
            })
        ) {
            prop_assert_eq!(aggregate(results), aggregate(shuffled));
        }

        /// Property: the count equals the number of distinct derived identities
        #[test]
        fn aggregate_counts_distinct_identities(results in results_strategy()) {
            let expected: BTreeSet<IdentityKey> = results
                .iter()
                .flat_map(|r| match &r.outcome {
                    crate::collector::Outcome::Commits(c) => c.clone(),
                    crate::collector::Outcome::Failed(_) => Vec::new(),
                })
                .map(|c| c.identity())
                .collect();
            let report = aggregate(results);
            prop_assert_eq!(report.contributor_count, expected.len());
        }
    }

    // ============================================================================
    // InclusionRules property tests
    // ============================================================================

    proptest! {
        /// Property: a skipped repository never survives rule application
        #[test]
        fn skipped_repos_are_never_kept(
            names in prop::collection::btree_set("[a-z]{1,6}", 1..8),
            skip_index in any::<prop::sample::Index>(),
        ) {
            let names: Vec<String> = names.into_iter().collect();
            let skipped = skip_index.get(&names).clone();
            let spec = SourceSpec::bitbucket(None, "u", "p");
            let inputs = RuleInputs {
                repos: Some(names.iter().map(|n| format!("ws/{}", n)).collect::<Vec<_>>().join(",")),
                skip_repos: Some(format!("ws/{}", skipped)),
                ..RuleInputs::default()
            };
            let rules = InclusionRules::from_inputs(&spec, &inputs).unwrap();

            let kept = rules.apply(rules.repos.clone());
            prop_assert_eq!(kept.len(), names.len() - 1);
            prop_assert!(kept.iter().all(|r| r.name != skipped));
        }
    }
}
