//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Integration tests for the `lastlog` utility.
//!
//! The utility always reads the system lastlog file, so the default run
//! is checked against whatever that file and the passwd database hold.

use plib::lastlog::LASTLOG_PATH;
use plib::passwd;
use plib::testing::{TestPlan, run_test_with_checker};
use std::process::Output;

fn lastlog_test_with_checker<F>(args: &[&str], checker: F)
where
    F: FnMut(&TestPlan, &Output),
{
    let str_args: Vec<String> = args.iter().map(|s| String::from(*s)).collect();
    run_test_with_checker(
        TestPlan {
            cmd: String::from("lastlog"),
            args: str_args,
            stdin_data: String::new(),
            expected_out: String::new(),
            expected_err: String::new(),
            expected_exit_code: 0,
        },
        checker,
    );
}

#[test]
fn test_lastlog_default() {
    lastlog_test_with_checker(&[], |_plan, output| {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if std::fs::File::open(LASTLOG_PATH).is_err() {
            // no readable lastlog on this host: fatal, nothing reported
            assert_eq!(output.status.code(), Some(1));
            assert!(stdout.is_empty(), "unexpected report: {}", stdout);
            assert!(
                stderr.starts_with("lastlog: "),
                "missing diagnostic: {}",
                stderr
            );
            return;
        }

        assert!(output.status.success(), "lastlog failed: {}", stderr);

        // one line per account, in passwd order
        let accounts = passwd::load().unwrap();
        let lines: Vec<&str> = stdout.lines().collect();
        assert_eq!(lines.len(), accounts.len());
        for (line, account) in lines.iter().zip(accounts.iter()) {
            assert!(
                line.starts_with(&account.name),
                "line {:?} does not start with {}",
                line,
                account.name
            );
        }
    });
}

#[test]
fn test_lastlog_unknown_option() {
    lastlog_test_with_checker(&["-x"], |_plan, output| {
        assert_eq!(output.status.code(), Some(2));
        assert!(output.stdout.is_empty());
    });
}

#[test]
fn test_lastlog_rejects_operand() {
    lastlog_test_with_checker(&["root"], |_plan, output| {
        assert_eq!(output.status.code(), Some(2));
        assert!(output.stdout.is_empty());
    });
}

#[test]
fn test_lastlog_help() {
    lastlog_test_with_checker(&["--help"], |_plan, output| {
        assert!(output.status.success(), "lastlog --help should succeed");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            stdout.contains("lastlog") && stdout.contains("login"),
            "Help should describe lastlog: {}",
            stdout
        );
    });
}

#[test]
fn test_lastlog_version() {
    lastlog_test_with_checker(&["--version"], |_plan, output| {
        assert!(output.status.success(), "lastlog --version should succeed");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            stdout.contains("posixutils") || stdout.contains("0."),
            "Version should show version info: {}",
            stdout
        );
    });
}
