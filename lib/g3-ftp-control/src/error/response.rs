/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FtpResponseError {
    #[error("read failed: {0:?}")]
    ReadFailed(io::Error),
    #[error("could not determine response status")]
    ConnectionClosed,
    #[error("line too long")]
    LineTooLong,
    #[error("invalid reply code {0}")]
    InvalidReplyCode(String),
    #[error("read response timed out after {0:?}")]
    ReadTimedOut(Duration),
}
