//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Enumeration of the system password database.
//!
//! The libc passwd cursor is process-wide state.  [`load`] rewinds it,
//! drains it and closes it again, so callers only ever see a finished
//! list of accounts.

use libc::{endpwent, getpwent, setpwent};
use std::ffi::CStr;
use std::io;
use std::os::raw::c_char;
use std::sync::Mutex;

/// Held for the whole of a scan so two `load` calls never share the cursor.
static PASSWD_LOCK: Mutex<()> = Mutex::new(());

/// One account record from the password database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passwd {
    pub name: String,
    pub passwd: String,
    pub uid: libc::uid_t,
    pub gid: libc::gid_t,
    pub comment: String,
    pub home: String,
    pub shell: String,
}

impl Passwd {
    /// Copies a libc `passwd` entry into owned strings.
    ///
    /// # Safety
    ///
    /// Every non-null string pointer in `pw` must point to a valid
    /// NUL-terminated C string.
    unsafe fn from_raw(pw: &libc::passwd) -> Passwd {
        Passwd {
            name: cstr_field(pw.pw_name),
            passwd: cstr_field(pw.pw_passwd),
            uid: pw.pw_uid,
            gid: pw.pw_gid,
            comment: cstr_field(pw.pw_gecos),
            home: cstr_field(pw.pw_dir),
            shell: cstr_field(pw.pw_shell),
        }
    }
}

unsafe fn cstr_field(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

/// Open cursor over the password database.
///
/// Creating the stream rewinds the cursor; dropping it closes the
/// database, whether or not iteration ran to the end.  There is only one
/// cursor per process, so at most one stream may exist at a time.
struct PasswdStream {
    done: bool,
}

impl PasswdStream {
    fn open() -> PasswdStream {
        unsafe { setpwent() };
        PasswdStream { done: false }
    }
}

impl Iterator for PasswdStream {
    type Item = io::Result<Passwd>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // getpwent() signals both end-of-database and failure with NULL;
        // only errno tells them apart.
        errno::set_errno(errno::Errno(0));
        let pwent = unsafe { getpwent() };

        if pwent.is_null() {
            self.done = true;
            let errno_res = errno::errno().0;
            if errno_res == 0 || errno_res == libc::ENOENT {
                return None;
            }
            return Some(Err(io::Error::from_raw_os_error(errno_res)));
        }

        Some(Ok(unsafe { Passwd::from_raw(&*pwent) }))
    }
}

impl Drop for PasswdStream {
    fn drop(&mut self) {
        unsafe { endpwent() };
    }
}

/// Gather every account from `entries`.
///
/// The first error ends the scan and the accounts read before it are
/// discarded.
pub fn collect_accounts<I>(entries: I) -> io::Result<Vec<Passwd>>
where
    I: IntoIterator<Item = io::Result<Passwd>>,
{
    entries.into_iter().collect()
}

/// Read the whole password database in one pass, in database order.
///
/// Concurrent calls are serialized.  Code that drives `setpwent` and
/// `getpwent` directly while `load` runs on another thread still moves the
/// same cursor and corrupts the scan.
pub fn load() -> io::Result<Vec<Passwd>> {
    let _guard = PASSWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let accounts = collect_accounts(PasswdStream::open())?;
    log::debug!("passwd: loaded {} accounts", accounts.len());
    Ok(accounts)
}
