/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{FtpControlChannel, FtpControlError, FtpTransport};

/// One data connection, as set up by a concrete active or passive strategy.
///
/// A stream is used either for reading or for writing, never both.
#[async_trait]
pub trait FtpDataStream<T: FtpTransport>: AsyncRead + AsyncWrite + Send + Unpin {
    fn set_read_timeout(&mut self, timeout: Duration);

    /// Size of the remote file if known, 0 if not.
    fn set_expected_length(&mut self, len: u64);

    /// Restart the transfer at `offset`, to be requested before the transfer
    /// command is sent.
    fn seek(&mut self, offset: u64);

    /// Negotiate the data connection (PASV / EPSV / PORT / EPRT), then send
    /// the transfer command on `control`.
    ///
    /// Return whether the server accepted the transfer command.
    async fn execute(
        &mut self,
        control: &mut FtpControlChannel<T>,
        command: &str,
    ) -> Result<bool, FtpControlError>;

    async fn dispose(&mut self);
}

pub trait FtpDataStreamProvider<T: FtpTransport> {
    type Stream: FtpDataStream<T>;

    /// PASV, or EPSV if `extended` is set.
    fn passive_stream(&self, extended: bool) -> Self::Stream;

    /// PORT, or EPRT if `extended` is set.
    fn active_stream(&self, extended: bool) -> Self::Stream;
}
