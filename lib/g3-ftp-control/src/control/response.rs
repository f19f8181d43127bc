/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use super::FtpControlChannel;
use crate::error::FtpResponseError;
use crate::{FtpControlError, FtpReplyStatus, FtpTransport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FtpResponseType {
    PositivePreliminary = 1,
    PositiveCompletion = 2,
    PositiveIntermediate = 3,
    TransientNegativeCompletion = 4,
    PermanentNegativeCompletion = 5,
}

impl FtpResponseType {
    fn from_digit(c: u8) -> Option<Self> {
        match c {
            b'1' => Some(FtpResponseType::PositivePreliminary),
            b'2' => Some(FtpResponseType::PositiveCompletion),
            b'3' => Some(FtpResponseType::PositiveIntermediate),
            b'4' => Some(FtpResponseType::TransientNegativeCompletion),
            b'5' => Some(FtpResponseType::PermanentNegativeCompletion),
            _ => None,
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(
            self,
            FtpResponseType::PositivePreliminary
                | FtpResponseType::PositiveCompletion
                | FtpResponseType::PositiveIntermediate
        )
    }
}

/// The last reply read from the control channel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FtpResponse {
    code: String,
    message: String,
    kind: Option<FtpResponseType>,
    info_lines: Vec<String>,
}

impl FtpResponse {
    /// The three digit reply code, empty if no reply has been read yet.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn code_u16(&self) -> u16 {
        self.code.parse().unwrap_or(0)
    }

    /// Text of the terminal line after the code.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Lines received before the terminal line, in order.
    pub fn info_lines(&self) -> &[String] {
        &self.info_lines
    }

    pub fn kind(&self) -> Option<FtpResponseType> {
        self.kind
    }

    pub fn success(&self) -> bool {
        self.kind.map(|k| k.is_positive()).unwrap_or(false)
    }
}

impl fmt::Display for FtpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}

/// Incremental reply parser.
///
/// Any line that is not `<3 digits><space>...` is buffered as an info line,
/// including the first line of a RFC 959 style `nnn-` multi-line reply.
#[derive(Debug, Default)]
pub struct FtpResponseParser {
    info_lines: Vec<String>,
}

impl FtpResponseParser {
    fn is_terminal(line: &[u8]) -> bool {
        line.len() >= 4 && line[..3].iter().all(u8::is_ascii_digit) && line[3] == b' '
    }

    /// Feed one line with the line terminator removed.
    ///
    /// Return the complete response once the terminal line has been seen, the
    /// parser is reset then and can be used for the next reply.
    pub fn feed_line(&mut self, line: &str) -> Result<Option<FtpResponse>, FtpResponseError> {
        let b = line.as_bytes();
        if !Self::is_terminal(b) {
            self.info_lines.push(line.to_string());
            return Ok(None);
        }

        let Some(kind) = FtpResponseType::from_digit(b[0]) else {
            self.info_lines.clear();
            return Err(FtpResponseError::InvalidReplyCode(line[..3].to_string()));
        };
        Ok(Some(FtpResponse {
            code: line[..3].to_string(),
            message: line[4..].to_string(),
            kind: Some(kind),
            info_lines: std::mem::take(&mut self.info_lines),
        }))
    }

    pub fn pending_lines(&self) -> usize {
        self.info_lines.len()
    }
}

impl<T: FtpTransport> FtpControlChannel<T> {
    async fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<(), FtpResponseError> {
        buf.clear();

        let max_len = self.config.max_line_len;
        let timeout = self.config.response_read_timeout;
        let len = match tokio::time::timeout(timeout, self.transport.read_line(buf, max_len)).await
        {
            Ok(Ok(len)) => len,
            Ok(Err(e)) => return Err(FtpResponseError::ReadFailed(e)),
            Err(_) => return Err(FtpResponseError::ReadTimedOut(timeout)),
        };
        self.touch();

        if len == 0 {
            return Err(FtpResponseError::ConnectionClosed);
        }
        if memchr::memchr(b'\n', buf).is_none() && buf.len() >= max_len {
            return Err(FtpResponseError::LineTooLong);
        }
        while matches!(buf.last(), Some(&(b'\n' | b'\r'))) {
            buf.pop();
        }
        Ok(())
    }

    async fn read_response_lines(&mut self) -> Result<FtpResponse, FtpResponseError> {
        let mut parser = FtpResponseParser::default();
        let mut buf = Vec::<u8>::with_capacity(256);
        loop {
            self.read_line(&mut buf).await?;
            let line = self.current_encoding().decode(&buf);
            self.tracer.trace_rsp(&line);

            if let Some(rsp) = parser.feed_line(&line)? {
                let status = FtpReplyStatus::Code(rsp.code());
                self.listener.on_reply(status, rsp.message());
                return Ok(rsp);
            }
            self.listener.on_reply(FtpReplyStatus::Info, &line);
        }
    }

    /// Read the next reply and cache it as the current response.
    ///
    /// The transport is closed if no full reply arrives in time.
    pub(crate) async fn read_response(&mut self) -> Result<bool, FtpControlError> {
        self.response = FtpResponse::default();
        match self.read_response_lines().await {
            Ok(rsp) => {
                self.response = rsp;
                Ok(self.response.success())
            }
            Err(FtpResponseError::ReadTimedOut(timeout)) => {
                log_msg!("no reply within {:?}, closing control connection", timeout);
                self.force_close().await;
                Err(FtpControlError::ResponseTimeout(timeout))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read an unsolicited reply, such as the greeting or the final reply of a
    /// transfer.
    pub async fn read_reply(&mut self) -> Result<bool, FtpControlError> {
        self.read_response().await
    }
}
