use patternkit::ordered::{insert_checked, insert_in_place, insertion_sort, is_sorted};
use patternkit::{insert, recover, OrderedError};

#[test]
fn test_scenarios_through_crate_root() {
    assert_eq!(insert(&[], 5), vec![5]);
    assert_eq!(insert(&[1, 3, 5, 7], 4), vec![1, 3, 4, 5, 7]);
    assert_eq!(insert(&[1, 3, 5, 7], 0), vec![0, 1, 3, 5, 7]);
    assert_eq!(insert(&[1, 3, 5, 7], 8), vec![1, 3, 5, 7, 8]);
    assert_eq!(insert(&[2, 2, 2], 2), vec![2, 2, 2, 2]);
}

#[test]
fn test_build_sorted_log_incrementally() {
    let mut log: Vec<(u32, &str)> = Vec::new();
    for entry in [(30, "c"), (10, "a"), (20, "b"), (10, "z")] {
        insert_in_place(&mut log, entry);
    }
    assert_eq!(log, vec![(10, "a"), (10, "z"), (20, "b"), (30, "c")]);
    assert!(is_sorted(&log));
}

#[test]
fn test_checked_insert_rejects_unsorted_input() {
    let err = insert_checked(&[1, 9, 4], 5).unwrap_err();
    assert_eq!(err, OrderedError::Unsorted { index: 1 });
}

#[test]
fn test_unsorted_input_never_panics() {
    let out = recover("unsorted insert", || insert(&[9, 1, 5], 3)).unwrap();
    assert_eq!(out.len(), 4);
    let mut expected = vec![9, 1, 5, 3];
    expected.sort_unstable();
    let mut got = out.clone();
    got.sort_unstable();
    assert_eq!(got, expected);
}

#[test]
fn test_insertion_sort_matches_std_sort() {
    let input = vec![5, -1, 3, 3, 0, 12, -7];
    let mut expected = input.clone();
    expected.sort();
    assert_eq!(insertion_sort(input), expected);
}
