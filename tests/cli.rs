// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::tempdir;

fn mandelpool() -> Command {
    Command::cargo_bin("mandelpool").unwrap()
}

#[test]
fn renders_and_writes_an_image() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("mandel.png");

    mandelpool()
        .args(&["--size", "40x30", "--samples", "2", "--iterations", "50"])
        .args(&["--blocks", "9", "--threads", "3", "--seed", "7", "--quiet"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Finished 1200 pixels"));

    assert!(out.exists());
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
}

#[test]
fn prints_progress_to_stderr() {
    mandelpool()
        .args(&["--size", "16x16", "--samples", "1", "--blocks", "4"])
        .args(&["--origin", "-0.2,-0.2", "--extent", "0.4"])
        .assert()
        .success()
        .stderr(predicate::str::contains("256/256 (100%)"));
}

#[test]
fn truncated_edges_are_reported() {
    mandelpool()
        .args(&["--size", "10x7", "--samples", "1", "--blocks", "9"])
        .args(&["--edges", "truncate", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Finished 54 pixels"));
}

#[test]
fn grid_finer_than_image_fails_to_start() {
    mandelpool()
        .args(&["--size", "3x3", "--blocks", "16", "--quiet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to start"))
        .stderr(predicate::str::contains("block grid does not fit"));
}

#[test]
fn zero_size_fails_to_start() {
    mandelpool()
        .args(&["--size", "0x10", "--quiet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("image dimensions must be positive"));
}

#[test]
fn rejects_malformed_arguments() {
    mandelpool()
        .args(&["--size", "wide"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not parse output image size"));

    mandelpool()
        .args(&["--threads", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Thread count must be between"));

    mandelpool()
        .args(&["--edges", "wrap"])
        .assert()
        .failure();
}

#[test]
fn oversized_block_counts_fail_cleanly() {
    mandelpool()
        .args(&["--blocks", "4294967295", "--quiet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to start"))
        .stderr(predicate::str::contains("block grid does not fit"));

    mandelpool()
        .args(&["--blocks", "18446744073709551615", "--quiet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Block count must be between"));
}

#[test]
fn oversubscription_is_a_warning() {
    mandelpool()
        .args(&["--size", "8x8", "--samples", "1", "--blocks", "4"])
        .args(&["--threads", "1024", "--quiet"])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("1024 workers requested on"));
}
