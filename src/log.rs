/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Logging macros.
//!
//! pica_gl is a library embedded in a game, so it doesn't own the terminal.
//! These macros forward to the [log] facade instead, using the module path as
//! the target, and the embedding program decides where the output goes.

/// Logs a message at warning level. Use this for errors or warnings, e.g. a
/// call that had to be ignored or degraded.
///
/// The message is prefixed with the module path, so it is clear where it comes
/// from.
macro_rules! log {
    ($($arg:tt)+) => {
        ::log::warn!(target: module_path!(), "{}: {}", module_path!(), format_args!($($arg)+))
    }
}

/// Like [log], but at debug level. This can be used for verbose things only
/// needed when debugging, like tracing which legacy calls were tolerated.
macro_rules! log_dbg {
    ($($arg:tt)+) => {
        ::log::debug!(target: module_path!(), "{}: {}", module_path!(), format_args!($($arg)+))
    }
}

/// Logs an informational message without the module path prefix.
///
/// Prefer [log] or [log_dbg] for errors and warnings.
macro_rules! echo {
    ($($arg:tt)+) => {
        ::log::info!(target: module_path!(), $($arg)+)
    };
}
