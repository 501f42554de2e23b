//! Property-based tests for name classification and work partitioning.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::groups::GroupModel;
    use crate::overlay::extension::{classify, split_extension, Classification};
    use crate::parallel::{partition, worker_count};
    use proptest::prelude::*;
    use std::time::Duration;

    fn model() -> GroupModel {
        GroupModel::new(["n1", "web", "all"], ["n2", "db"])
    }

    // ============================================================================
    // classify property tests
    // ============================================================================

    proptest! {
        /// Property: a name without any dot is its own destination at GENERIC rank
        #[test]
        fn plain_names_are_generic(name in "[a-zA-Z0-9_-]{1,20}") {
            let groups = model();
            match classify(&name, &groups) {
                Classification::Entry(c) => {
                    prop_assert_eq!(&c.dest_name, &name);
                    prop_assert_eq!(c.rank, groups.generic());
                    prop_assert!(!c.tagged);
                    prop_assert!(!c.is_post);
                }
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }

        /// Property: tagging with a member group strips the tag and ranks by position
        #[test]
        fn member_tags_rank_by_position(
            base in "[a-z]{1,8}(\\.[a-z]{1,4})?",
            idx in 0usize..3,
        ) {
            let groups = model();
            let group = &groups.groups()[idx];
            let name = format!("{}._{}", base, group);
            match classify(&name, &groups) {
                Classification::Entry(c) => {
                    prop_assert_eq!(c.rank, idx);
                    prop_assert!(c.tagged);
                    prop_assert!(c.rank < groups.generic());
                    if base.ends_with(".post") {
                        prop_assert!(c.is_post);
                    } else {
                        prop_assert_eq!(&c.dest_name, &base);
                    }
                }
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }

        /// Property: both post-script spellings classify identically
        #[test]
        fn post_spellings_agree(base in "[a-z]{1,8}(\\.[a-z]{1,4})?", idx in 0usize..3) {
            let groups = model();
            let group = &groups.groups()[idx];
            let a = classify(&format!("{}.post._{}", base, group), &groups);
            let b = classify(&format!("{}._{}.post", base, group), &groups);
            match (a, b) {
                (Classification::Entry(a), Classification::Entry(b)) => {
                    prop_assert_eq!(a.dest_name, b.dest_name);
                    prop_assert_eq!(a.rank, b.rank);
                    prop_assert!(a.is_post && b.is_post);
                }
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }

        /// Property: split_extension never loses characters
        #[test]
        fn split_extension_concatenates(name in "[a-z._]{0,20}") {
            let (base, ext) = split_extension(&name);
            prop_assert_eq!(format!("{}{}", base, ext), name.as_str());
            prop_assert!(ext.is_empty() || ext.starts_with('.'));
        }
    }

    // ============================================================================
    // partition property tests
    // ============================================================================

    proptest! {
        /// Property: chunks cover 0..len exactly once, in order, without gaps
        #[test]
        fn partition_covers_exactly_once(len in 0usize..500, concurrency in 0usize..64) {
            let workers = worker_count(len, concurrency, Duration::ZERO);
            let ranges = partition(len, workers);

            let mut next = 0;
            for range in &ranges {
                prop_assert_eq!(range.start, next);
                prop_assert!(range.end > range.start);
                next = range.end;
            }
            prop_assert_eq!(next, len);
            prop_assert!(ranges.len() <= concurrency.max(1).min(len));
        }

        /// Property: any delay serializes the run into one worker
        #[test]
        fn delay_forces_one_worker(len in 1usize..500, concurrency in 0usize..64, ms in 1u64..1000) {
            prop_assert_eq!(worker_count(len, concurrency, Duration::from_millis(ms)), 1);
            prop_assert_eq!(partition(len, 1), vec![0..len]);
        }
    }
}
