/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::time::Duration;

use thiserror::Error;

use super::FtpResponseError;
use crate::control::FtpResponse;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FtpErrorKind {
    ProtocolViolation,
    ResponseTimeout,
    CommandFailure,
    Configuration,
    SecurityNotAvailable,
    Transport,
    LockTimedOut,
    RestartNotSupported,
}

#[derive(Debug, Error)]
pub enum FtpControlError {
    #[error("protocol violation: {0}")]
    ProtocolViolation(FtpResponseError),
    /// The transport has been closed, reconnect before retrying.
    #[error("no response received within {0:?}")]
    ResponseTimeout(Duration),
    #[error("command failed: {0}")]
    CommandFailure(FtpResponse),
    #[error("configuration error: {0}")]
    Configuration(&'static str),
    #[error("secure connection not available: {0}")]
    SecurityNotAvailable(FtpResponse),
    #[error("transport error: {0:?}")]
    Transport(#[from] io::Error),
    #[error("timed out to acquire the control channel lock")]
    LockTimedOut,
    #[error("restart of transfer is not supported by server")]
    RestartNotSupported,
}

impl FtpControlError {
    pub fn kind(&self) -> FtpErrorKind {
        match self {
            FtpControlError::ProtocolViolation(_) => FtpErrorKind::ProtocolViolation,
            FtpControlError::ResponseTimeout(_) => FtpErrorKind::ResponseTimeout,
            FtpControlError::CommandFailure(_) => FtpErrorKind::CommandFailure,
            FtpControlError::Configuration(_) => FtpErrorKind::Configuration,
            FtpControlError::SecurityNotAvailable(_) => FtpErrorKind::SecurityNotAvailable,
            FtpControlError::Transport(_) => FtpErrorKind::Transport,
            FtpControlError::LockTimedOut => FtpErrorKind::LockTimedOut,
            FtpControlError::RestartNotSupported => FtpErrorKind::RestartNotSupported,
        }
    }

    /// The server response attached to this error, if any.
    pub fn response(&self) -> Option<&FtpResponse> {
        match self {
            FtpControlError::CommandFailure(rsp) | FtpControlError::SecurityNotAvailable(rsp) => {
                Some(rsp)
            }
            _ => None,
        }
    }
}

impl From<FtpResponseError> for FtpControlError {
    fn from(e: FtpResponseError) -> Self {
        match e {
            FtpResponseError::ReadFailed(e) => FtpControlError::Transport(e),
            FtpResponseError::ReadTimedOut(timeout) => FtpControlError::ResponseTimeout(timeout),
            _ => FtpControlError::ProtocolViolation(e),
        }
    }
}
