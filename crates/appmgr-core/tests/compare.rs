mod common;

use appmgr_core::resolve::{is_newer_version, updates_available};

use common::update;

#[test]
fn numeric_segments_not_lexical() {
    assert!(is_newer_version("1.10.0", "1.9.9"));
    assert!(!is_newer_version("1.9.9", "1.10.0"));
}

#[test]
fn equal_versions_are_not_newer() {
    assert!(!is_newer_version("1.0", "1.0"));
    assert!(!is_newer_version("1.2", "1.2.0"));
    assert!(!is_newer_version("1.2.0", "1.2"));
}

#[test]
fn missing_trailing_segments_count_as_zero() {
    assert!(is_newer_version("1.2.1", "1.2"));
    assert!(!is_newer_version("1.2", "1.2.1"));
}

#[test]
fn no_baseline_means_newer() {
    assert!(is_newer_version("0.1", ""));
    assert!(!is_newer_version("", ""));
}

#[test]
fn non_numeric_segments_count_as_zero() {
    assert!(!is_newer_version("1.x", "1.0"));
    assert!(is_newer_version("1.1", "1.x"));
}

#[test]
fn prerelease_suffixes_are_not_semver() {
    // Only the leading digits of a segment are compared.
    assert!(!is_newer_version("1.0.0-rc1", "1.0.0"));
    assert!(!is_newer_version("1.0.0", "1.0.0-rc1"));
}

#[test]
fn updates_available_filters_stale_offers() {
    let updates = vec![
        update("a", "1.0", "1.1"),
        update("b", "2.0", "2.0"),
        update("c", "", "0.1"),
        update("d", "3.1", "3.0"),
    ];

    let ids: Vec<&str> = updates_available(&updates).iter().map(|u| u.id.as_str()).collect();

    assert_eq!(ids, vec!["a", "c"]);
}
