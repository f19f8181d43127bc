/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use tokio::time::Instant;

use crate::debug::FtpTracer;
use crate::{
    FtpCapability, FtpControlConfig, FtpControlError, FtpDataType, FtpEventListener,
    FtpReplyStatus, FtpTextEncoding, FtpTraceSink, FtpTransport, NoopEventListener,
};

mod response;
pub use response::{FtpResponse, FtpResponseParser, FtpResponseType};

mod command;
pub use command::FtpCommand;

mod data;
mod health;
mod session;

/// Command/response state of one FTP control connection.
///
/// All methods take `&mut self`, wrap the channel in a
/// [`FtpControlConnection`](crate::FtpControlConnection) to share it.
pub struct FtpControlChannel<T: FtpTransport> {
    config: FtpControlConfig,
    transport: T,
    listener: Arc<dyn FtpEventListener>,
    tracer: FtpTracer,
    response: FtpResponse,
    /// None until FEAT has been sent on the current connection
    capabilities: Option<FtpCapability>,
    data_type: Option<FtpDataType>,
    utf8_enabled: bool,
    last_activity: Option<Instant>,
}

impl<T: FtpTransport> FtpControlChannel<T> {
    pub fn new(transport: T, config: FtpControlConfig) -> Self {
        FtpControlChannel {
            config,
            transport,
            listener: Arc::new(NoopEventListener),
            tracer: FtpTracer::default(),
            response: FtpResponse::default(),
            capabilities: None,
            data_type: None,
            utf8_enabled: false,
            last_activity: None,
        }
    }

    pub fn set_event_listener(&mut self, listener: Arc<dyn FtpEventListener>) {
        self.listener = listener;
    }

    pub fn set_trace_sink(&mut self, sink: Arc<dyn FtpTraceSink>) {
        self.tracer.set_sink(sink);
    }

    /// Rewrite every transcript line before it reaches the trace sink.
    pub fn set_log_transform<F>(&mut self, transform: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.tracer.set_transform(Some(Arc::new(transform)));
    }

    pub fn clear_log_transform(&mut self) {
        self.tracer.set_transform(None);
    }

    #[inline]
    pub fn config(&self) -> &FtpControlConfig {
        &self.config
    }

    #[inline]
    pub fn config_mut(&mut self) -> &mut FtpControlConfig {
        &mut self.config
    }

    /// The reply to the last command, overwritten by each new command.
    #[inline]
    pub fn response(&self) -> &FtpResponse {
        &self.response
    }

    #[inline]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[inline]
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    #[inline]
    pub fn utf8_enabled(&self) -> bool {
        self.utf8_enabled
    }

    /// The representation type last confirmed by the server.
    #[inline]
    pub fn data_type(&self) -> Option<FtpDataType> {
        self.data_type
    }

    fn current_encoding(&self) -> FtpTextEncoding {
        if self.utf8_enabled {
            FtpTextEncoding::Utf8
        } else {
            self.config.fallback_encoding
        }
    }

    /// Send a command and read its reply.
    ///
    /// The connection is (re)established first if needed. Return whether the
    /// reply is positive, the reply itself can be found in
    /// [`response`](Self::response).
    pub async fn execute(&mut self, command: &str) -> Result<bool, FtpControlError> {
        self.ensure_ready().await?;
        self.drain_stale().await?;
        self.execute_raw(command).await
    }

    pub(crate) async fn execute_raw(&mut self, command: &str) -> Result<bool, FtpControlError> {
        self.write_line(command).await?;
        self.read_response().await
    }

    /// Send a sequence of commands and collect all replies in order.
    ///
    /// With pipelining enabled all command lines are written at once.
    pub async fn execute_batch(
        &mut self,
        commands: &[&str],
    ) -> Result<Vec<FtpResponse>, FtpControlError> {
        self.ensure_ready().await?;
        self.drain_stale().await?;

        let mut responses = Vec::with_capacity(commands.len());
        if self.config.pipelining && commands.len() > 1 {
            let mut buf = Vec::<u8>::with_capacity(commands.len() * 32);
            for cmd in commands {
                buf.extend_from_slice(&self.encode_line(cmd));
                self.tracer.trace_cmd(command::trace_form(cmd));
            }
            self.transport.write_bytes(&buf).await?;
            self.touch();
            for _ in commands {
                self.read_response().await?;
                responses.push(self.response.clone());
            }
        } else {
            for cmd in commands {
                self.execute_raw(cmd).await?;
                responses.push(self.response.clone());
            }
        }
        Ok(responses)
    }

    /// Send NOOP if the connection has been idle for the keep-alive interval.
    ///
    /// Return whether a NOOP has been sent.
    pub async fn keep_alive(&mut self) -> Result<bool, FtpControlError> {
        let interval = self.config.keep_alive_interval;
        if interval.is_zero() || !self.transport.is_connected() {
            return Ok(false);
        }
        if self.idle_time() < interval {
            return Ok(false);
        }
        self.execute(FtpCommand::NOOP.as_str()).await?;
        Ok(true)
    }

    /// Discard bytes that arrived outside of any request, like a late reply
    /// of an aborted transfer.
    async fn drain_stale(&mut self) -> Result<(), FtpControlError> {
        let mut buf = [0u8; 512];
        let mut pending = Vec::<u8>::new();
        while self.transport.available_bytes() > 0 {
            let len = self.transport.read_bytes(&mut buf).await?;
            if len == 0 {
                break;
            }
            pending.extend_from_slice(&buf[..len]);

            let mut start = 0;
            while let Some(p) = memchr::memchr(b'\n', &pending[start..]) {
                let end = start + p;
                self.report_stale_line(&pending[start..end]);
                start = end + 1;
            }
            pending.drain(..start);
        }
        if !pending.is_empty() {
            self.report_stale_line(&pending);
        }
        Ok(())
    }

    fn report_stale_line(&self, line: &[u8]) {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            return;
        }
        let line = self.current_encoding().decode(line);
        self.tracer.trace_rsp(&line);
        self.listener.on_reply(FtpReplyStatus::Info, &line);
    }

    /// Server capabilities, `FEAT` is sent on first use after each connect.
    pub async fn capabilities(&mut self) -> Result<FtpCapability, FtpControlError> {
        if let Some(caps) = self.capabilities {
            return Ok(caps);
        }
        self.ensure_ready().await?;
        self.load_capabilities().await
    }

    pub(crate) async fn load_capabilities(&mut self) -> Result<FtpCapability, FtpControlError> {
        if let Some(caps) = self.capabilities {
            return Ok(caps);
        }

        let caps = if self.execute_raw(FtpCommand::FEAT.as_str()).await? {
            FtpCapability::from_feat_reply(self.response.info_lines())
        } else {
            FtpCapability::empty()
        };
        log_msg!("server capabilities: {:?}", caps);
        self.capabilities = Some(caps);
        Ok(caps)
    }

    pub async fn has_capability(&mut self, flag: FtpCapability) -> Result<bool, FtpControlError> {
        let caps = self.capabilities().await?;
        Ok(caps.contains(flag))
    }

    /// Revoke a capability until the next reconnect.
    pub async fn remove_capability(&mut self, flag: FtpCapability) -> Result<(), FtpControlError> {
        let caps = self.capabilities().await?;
        self.capabilities = Some(caps.difference(flag));
        Ok(())
    }
}
