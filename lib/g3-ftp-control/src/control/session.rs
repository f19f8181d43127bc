/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use super::{FtpCommand, FtpControlChannel, FtpResponseType};
use crate::{FtpCapability, FtpControlError, FtpSecurityNotAvailable, FtpSslMode, FtpTransport};

impl<T: FtpTransport> FtpControlChannel<T> {
    /// Open a new physical connection and run the full session setup.
    ///
    /// All cached server state is dropped first. On failure the transport is
    /// closed again.
    pub async fn connect(&mut self) -> Result<(), FtpControlError> {
        self.capabilities = None;
        self.utf8_enabled = false;
        self.data_type = None;
        self.last_activity = None;

        self.transport
            .connect(&self.config.host, self.config.port)
            .await?;
        log_msg!("connected to {}:{}", self.config.host, self.config.port);

        if let Err(e) = self.negotiate().await {
            self.force_close().await;
            return Err(e);
        }
        Ok(())
    }

    async fn negotiate(&mut self) -> Result<(), FtpControlError> {
        if self.config.ssl_mode == FtpSslMode::Implicit {
            self.transport.upgrade_to_tls().await?;
        }

        if !self.read_response().await? {
            return Err(FtpControlError::CommandFailure(self.response.clone()));
        }

        if self.config.ssl_mode == FtpSslMode::Explicit {
            self.auth_tls().await?;
        }

        if self.transport.is_tls_active() && self.config.data_channel_encryption {
            self.protect_data_channel().await?;
        }

        self.login().await
    }

    async fn auth_tls(&mut self) -> Result<(), FtpControlError> {
        if self.execute_raw(FtpCommand::AUTH_TLS.as_str()).await?
            || self.execute_raw(FtpCommand::AUTH_SSL.as_str()).await?
        {
            self.transport.upgrade_to_tls().await?;
            return Ok(());
        }

        let mut event = FtpSecurityNotAvailable::new(self.response.clone());
        self.listener.on_security_not_available(&mut event);
        if event.is_cancelled() {
            return Err(FtpControlError::SecurityNotAvailable(event.into_response()));
        }
        log_msg!("AUTH rejected by server, continue without tls: {}", self.response);
        Ok(())
    }

    async fn protect_data_channel(&mut self) -> Result<(), FtpControlError> {
        if !self.execute_raw(FtpCommand::PBSZ_0.as_str()).await? {
            log_msg!("PBSZ rejected: {}", self.response);
        }
        if !self.execute_raw(FtpCommand::PROT_P.as_str()).await? {
            return Err(FtpControlError::CommandFailure(self.response.clone()));
        }
        Ok(())
    }

    async fn login(&mut self) -> Result<(), FtpControlError> {
        if let Some(username) = self.config.username.clone() {
            let cmd = FtpCommand::USER.with_param(&username);
            if !self.execute_raw(&cmd).await? {
                return Err(FtpControlError::CommandFailure(self.response.clone()));
            }

            if self.response.kind() == Some(FtpResponseType::PositiveIntermediate) {
                let Some(password) = self.config.password.clone() else {
                    return Err(FtpControlError::Configuration(
                        "server asked for a password but none is set",
                    ));
                };
                let cmd = FtpCommand::PASS.with_param(&password);
                if !self.execute_raw(&cmd).await? {
                    return Err(FtpControlError::CommandFailure(self.response.clone()));
                }
            }
        }

        if !self.utf8_enabled && self.load_capabilities().await?.contains(FtpCapability::UTF8)
        {
            if self.execute_raw(FtpCommand::OPTS_UTF8_ON.as_str()).await? {
                self.utf8_enabled = true;
            } else {
                log_msg!("OPTS UTF8 ON rejected: {}", self.response);
            }
        }
        Ok(())
    }
}
