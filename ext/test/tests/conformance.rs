//! Conformance tests that run YAML fixtures against patex
//!
//! Run with: cargo test -p patex-test --test conformance

#![cfg(feature = "fixtures")]

use patex::BUILTIN_EXPANDERS;
use patex_test::fixture::Fixture;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// The fixtures directory of this crate
fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load every fixture in a directory
fn load_fixtures_in_dir(dir: &Path) -> Vec<Fixture> {
    assert!(
        dir.exists(),
        "Fixtures directory does not exist: {}",
        dir.display()
    );

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| {
            path.extension()
                .is_some_and(|e| e == "yaml" || e == "yml")
        })
        .collect();
    paths.sort();

    paths
        .iter()
        .flat_map(|path| {
            let yaml = fs::read_to_string(path).expect("read yaml");
            // Parse potentially multiple fixtures (separated by ---)
            Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
                panic!("Failed to parse {}: {}", path.display(), e);
            })
        })
        .collect()
}

/// Load and run all fixtures in a directory
fn run_fixtures_in_dir(dir: &Path) {
    for fixture in load_fixtures_in_dir(dir) {
        println!("  Running: {}", fixture.name);
        fixture.run_and_assert();
    }
}

#[test]
fn test_string_expanders() {
    run_fixtures_in_dir(&fixtures_dir().join("01_string"));
}

#[test]
fn test_numeric_expanders() {
    run_fixtures_in_dir(&fixtures_dir().join("02_numeric"));
}

#[test]
fn test_collection_expanders() {
    run_fixtures_in_dir(&fixtures_dir().join("03_collection"));
}

#[test]
fn test_format_expanders() {
    run_fixtures_in_dir(&fixtures_dir().join("04_format"));
}

#[test]
fn test_timezone_expanders() {
    run_fixtures_in_dir(&fixtures_dir().join("05_timezone"));
}

#[test]
fn test_resolution() {
    run_fixtures_in_dir(&fixtures_dir().join("06_resolution"));
}

#[test]
fn every_builtin_has_a_fixture() {
    let mut covered = BTreeSet::new();
    for entry in fs::read_dir(fixtures_dir()).expect("read fixtures dir") {
        let dir = entry.expect("dir entry").path();
        if dir.is_dir() {
            for fixture in load_fixtures_in_dir(&dir) {
                if fixture.expect_error.is_none() {
                    covered.extend(fixture.expander_names().into_iter().map(str::to_owned));
                }
            }
        }
    }

    let missing: Vec<&str> = BUILTIN_EXPANDERS
        .iter()
        .copied()
        .filter(|name| !covered.contains(*name))
        .collect();
    assert!(missing.is_empty(), "built-ins without fixtures: {missing:?}");
}
