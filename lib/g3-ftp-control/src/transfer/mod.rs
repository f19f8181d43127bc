/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use crate::FtpCommand;

mod stream;
pub use stream::{FtpDataStream, FtpDataStreamProvider};

/// Representation type of the data channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FtpDataType {
    Ascii,
    Binary,
}

impl FtpDataType {
    pub fn command(&self) -> FtpCommand {
        match self {
            FtpDataType::Ascii => FtpCommand::TYPE_A,
            FtpDataType::Binary => FtpCommand::TYPE_I,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FtpFileAccess {
    Read,
    Write,
    Append,
}

impl FtpFileAccess {
    pub fn command(&self) -> FtpCommand {
        match self {
            FtpFileAccess::Read => FtpCommand::RETR,
            FtpFileAccess::Write => FtpCommand::STOR,
            FtpFileAccess::Append => FtpCommand::APPE,
        }
    }

    /// Whether a start offset applies, appends always go to the end.
    pub fn allow_offset(&self) -> bool {
        !matches!(self, FtpFileAccess::Append)
    }
}
