//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use clap::Parser;
use gettextrs::{LocaleCategory, bind_textdomain_codeset, gettext, setlocale, textdomain};
use plib::PROJECT_NAME;
use plib::lastlog::{LASTLOG_PATH, LASTLOG_SIZE, Lastlog, LastlogFile};
use plib::passwd::{self, Passwd};
use std::io::{self, Read, Seek, Write};
use std::process::ExitCode;

/// lastlog - report the most recent login of all users
#[derive(Parser)]
#[command(
    version,
    about = gettext("lastlog - report the most recent login of all users")
)]
struct Args {}

/// One output line: an account and its most recent login.
#[derive(Debug, PartialEq, Eq)]
struct LoginReport {
    name: String,
    line: String,
    host: String,
    latest: String,
}

impl LoginReport {
    fn new(account: &Passwd, entry: Lastlog) -> LoginReport {
        let latest = if entry.never_logged_in() {
            gettext("**Never logged in**")
        } else {
            fmt_timestamp(entry.timestamp)
        };

        LoginReport {
            name: account.name.clone(),
            line: entry.line,
            host: entry.host,
            latest,
        }
    }
}

// local time, in the layout traditionally used by lastlog
fn fmt_timestamp(ts: i64) -> String {
    use chrono::{Local, TimeZone};
    match Local.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%a %b %e %H:%M:%S %z %Y").to_string(),
        None => ts.to_string(),
    }
}

/// Look up every account, in directory order.  Stops at the first failed
/// lookup.
fn build_report<R: Read + Seek>(
    accounts: &[Passwd],
    lastlog: &mut LastlogFile<R>,
) -> io::Result<Vec<LoginReport>> {
    accounts
        .iter()
        .map(|account| {
            let entry = lastlog.lookup(account.uid)?;
            log::debug!("{} (uid {}): {:?}", account.name, account.uid, entry);
            Ok(LoginReport::new(account, entry))
        })
        .collect()
}

fn write_report<W: Write>(out: &mut W, report: &[LoginReport]) -> io::Result<()> {
    for r in report {
        writeln!(
            out,
            "{:<16} {:<8} {:<16} {}",
            r.name, r.line, r.host, r.latest
        )?;
    }
    out.flush()
}

fn main() -> ExitCode {
    env_logger::init();

    setlocale(LocaleCategory::LcAll, "");
    textdomain(PROJECT_NAME).ok();
    bind_textdomain_codeset(PROJECT_NAME, "UTF-8").ok();

    let _args = Args::parse();

    // The passwd database is drained and closed before lastlog is opened.
    let accounts = match passwd::load() {
        Ok(accounts) => accounts,
        Err(e) => {
            eprintln!(
                "lastlog: {}: {}",
                gettext("cannot read password database"),
                e
            );
            return ExitCode::from(1);
        }
    };

    let mut lastlog = match LastlogFile::open(LASTLOG_PATH) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("lastlog: {}: {}", LASTLOG_PATH, e);
            return ExitCode::from(1);
        }
    };

    log::debug!(
        "{}: {} bytes, {} record slots",
        LASTLOG_PATH,
        lastlog.size(),
        lastlog.size() / LASTLOG_SIZE as u64
    );

    let report = match build_report(&accounts, &mut lastlog) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("lastlog: {}: {}", LASTLOG_PATH, e);
            return ExitCode::from(1);
        }
    };

    if let Err(e) = write_report(&mut io::stdout().lock(), &report) {
        eprintln!("lastlog: {}: {}", gettext("write error"), e);
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}
