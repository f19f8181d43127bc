/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use crate::control::FtpResponse;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FtpReplyStatus<'a> {
    /// an intermediate line of a multi-line reply
    Info,
    Code(&'a str),
}

impl fmt::Display for FtpReplyStatus<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtpReplyStatus::Info => f.write_str("INFO"),
            FtpReplyStatus::Code(code) => f.write_str(code),
        }
    }
}

/// Raised when neither `AUTH TLS` nor `AUTH SSL` has been accepted.
///
/// The session continues in plaintext unless a listener cancels it.
#[derive(Debug)]
pub struct FtpSecurityNotAvailable {
    response: FtpResponse,
    cancel: bool,
}

impl FtpSecurityNotAvailable {
    pub(crate) fn new(response: FtpResponse) -> Self {
        FtpSecurityNotAvailable {
            response,
            cancel: false,
        }
    }

    /// The reply to the last `AUTH` command.
    pub fn response(&self) -> &FtpResponse {
        &self.response
    }

    pub fn cancel(&mut self) {
        self.cancel = true;
    }

    pub fn set_cancel(&mut self, cancel: bool) {
        self.cancel = cancel;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
    }

    pub(crate) fn into_response(self) -> FtpResponse {
        self.response
    }
}

/// Observer of control channel events, all methods are no-op by default.
pub trait FtpEventListener: Send + Sync {
    fn on_reply(&self, _status: FtpReplyStatus<'_>, _message: &str) {}

    fn on_security_not_available(&self, _event: &mut FtpSecurityNotAvailable) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopEventListener;

impl FtpEventListener for NoopEventListener {}
