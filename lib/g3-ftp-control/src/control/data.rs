/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use chrono::{DateTime, Utc};

use super::{FtpCommand, FtpControlChannel};
use crate::time_val;
use crate::{
    FtpCapability, FtpControlError, FtpDataStream, FtpDataStreamProvider, FtpDataType,
    FtpFileAccess, FtpTransport,
};

fn parse_size(message: &str) -> Option<u64> {
    let start = message.find(|c: char| c.is_ascii_digit())?;
    let digits = &message[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

impl<T: FtpTransport> FtpControlChannel<T> {
    /// Switch the representation type, nothing is sent if it is already set.
    pub async fn set_data_type(&mut self, data_type: FtpDataType) -> Result<(), FtpControlError> {
        if self.data_type == Some(data_type) {
            return Ok(());
        }
        if !self.execute(data_type.command().as_str()).await? {
            return Err(FtpControlError::CommandFailure(self.response.clone()));
        }
        self.data_type = Some(data_type);
        Ok(())
    }

    /// Create a data stream of the configured channel type.
    ///
    /// The extended variant is only used while the server still has the
    /// matching EPSV / EPRT capability.
    pub async fn open_data_stream<P>(
        &mut self,
        provider: &P,
        data_type: FtpDataType,
    ) -> Result<P::Stream, FtpControlError>
    where
        P: FtpDataStreamProvider<T>,
    {
        self.set_data_type(data_type).await?;

        let channel_type = self.config.data_channel_type;
        let mut stream = if channel_type.is_passive() {
            let extended =
                channel_type.is_extended() && self.has_capability(FtpCapability::EPSV).await?;
            provider.passive_stream(extended)
        } else {
            let extended =
                channel_type.is_extended() && self.has_capability(FtpCapability::EPRT).await?;
            provider.active_stream(extended)
        };
        stream.set_read_timeout(self.config.data_channel_read_timeout);
        Ok(stream)
    }

    /// Open a remote file for reading or writing.
    ///
    /// A non-zero `offset` requires restart support on the server, it is
    /// ignored for [`FtpFileAccess::Append`].
    pub async fn open_file<P>(
        &mut self,
        provider: &P,
        path: &str,
        data_type: FtpDataType,
        access: FtpFileAccess,
        offset: u64,
    ) -> Result<P::Stream, FtpControlError>
    where
        P: FtpDataStreamProvider<T>,
    {
        let restart = offset > 0 && access.allow_offset();
        if restart && !self.has_capability(FtpCapability::REST).await? {
            return Err(FtpControlError::RestartNotSupported);
        }

        // SIZE switches to binary, so query it before the requested type is set
        let size = self.get_file_size(path).await;
        let mut stream = self.open_data_stream(provider, data_type).await?;
        stream.set_expected_length(size);
        if restart {
            stream.seek(offset);
        }

        let cmd = access.command().with_param(path);
        match stream.execute(self, &cmd).await {
            Ok(true) => Ok(stream),
            Ok(false) => {
                stream.dispose().await;
                Err(FtpControlError::CommandFailure(self.response.clone()))
            }
            Err(e) => {
                stream.dispose().await;
                Err(e)
            }
        }
    }

    async fn query_file_size(&mut self, path: &str) -> Result<Option<u64>, FtpControlError> {
        if !self.has_capability(FtpCapability::SIZE).await? {
            return Ok(None);
        }
        self.set_data_type(FtpDataType::Binary).await?;
        if !self.execute(&FtpCommand::SIZE.with_param(path)).await? {
            return Ok(None);
        }
        Ok(parse_size(self.response.message()))
    }

    /// Size of a remote file, 0 if it can not be determined.
    pub async fn get_file_size(&mut self, path: &str) -> u64 {
        match self.query_file_size(path).await {
            Ok(Some(size)) => size,
            Ok(None) => 0,
            Err(e) => {
                log_msg!("failed to get size of {}: {}", path, e);
                0
            }
        }
    }

    async fn query_modified_time(
        &mut self,
        path: &str,
    ) -> Result<Option<DateTime<Utc>>, FtpControlError> {
        if !self.has_capability(FtpCapability::MDTM).await? {
            return Ok(None);
        }
        if !self.execute(&FtpCommand::MDTM.with_param(path)).await? {
            return Ok(None);
        }
        Ok(time_val::parse_mdtm_reply(self.response.message()))
    }

    /// Modification time of a remote file if the server reports it.
    pub async fn get_modified_time(&mut self, path: &str) -> Option<DateTime<Utc>> {
        match self.query_modified_time(path).await {
            Ok(v) => v,
            Err(e) => {
                log_msg!("failed to get modification time of {}: {}", path, e);
                None
            }
        }
    }
}
