/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use tokio::time::Instant;

use super::{FtpCommand, FtpControlChannel};
use crate::{FtpControlError, FtpTransport};

const HEALTH_CHECK_IDLE: Duration = Duration::from_secs(30);
const HEALTH_CHECK_POLL: Duration = Duration::from_millis(500);
const DISCONNECT_POLL: Duration = Duration::from_millis(50);

impl<T: FtpTransport> FtpControlChannel<T> {
    #[inline]
    pub(super) fn touch(&mut self) {
        self.last_activity = Some(Instant::now());
    }

    pub(super) fn idle_time(&mut self) -> Duration {
        let last = *self.last_activity.get_or_insert_with(Instant::now);
        last.elapsed()
    }

    fn needs_health_check(&mut self) -> bool {
        self.idle_time() > HEALTH_CHECK_IDLE
    }

    /// A readable socket with nothing to read means the peer has gone.
    async fn peer_closed(&mut self, timeout: Duration) -> bool {
        match self.transport.poll_readable(timeout).await {
            Ok(true) => self.transport.available_bytes() == 0,
            Ok(false) => false,
            Err(e) => {
                log_msg!("poll on control connection failed: {}", e);
                true
            }
        }
    }

    /// Make sure a usable connection exists before writing a command.
    pub(super) async fn ensure_ready(&mut self) -> Result<(), FtpControlError> {
        if self.transport.is_connected() && self.needs_health_check() {
            let closed = self.peer_closed(HEALTH_CHECK_POLL).await;
            if closed {
                log_msg!(
                    "control connection to {} closed by peer, reconnecting",
                    self.config.host
                );
                self.force_close().await;
            }
        }
        if !self.transport.is_connected() {
            self.connect().await?;
        }
        Ok(())
    }

    pub(super) async fn force_close(&mut self) {
        if let Err(e) = self.transport.disconnect().await {
            log_msg!("error when closing control connection: {}", e);
        }
    }

    /// Close the connection, with `QUIT` if the peer is still there.
    ///
    /// This never fails.
    pub async fn disconnect(&mut self) {
        if !self.transport.is_connected() {
            return;
        }
        if !self.peer_closed(DISCONNECT_POLL).await {
            match self.execute_raw(FtpCommand::QUIT.as_str()).await {
                Ok(true) => {}
                Ok(false) => log_msg!("QUIT rejected: {}", self.response),
                Err(e) => log_msg!("QUIT failed: {}", e),
            }
        }
        self.force_close().await;
    }
}
