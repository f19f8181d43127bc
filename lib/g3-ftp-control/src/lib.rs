/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Control channel engine for FTP clients.
//!
//! [`FtpControlChannel`] owns the command/response state machine of one
//! control connection: greeting, explicit or implicit TLS, data channel
//! protection, login, capability discovery, representation type caching and
//! the opening of data streams. [`FtpControlConnection`] wraps a channel in an
//! exclusive lock so that it can be shared between tasks, an open
//! [`FtpTransfer`] keeps that lock until the transfer is over.
//!
//! The raw transport and the concrete data channel mechanics are supplied by
//! the caller through [`FtpTransport`] and [`FtpDataStreamProvider`].

#[macro_use]
mod debug;
pub use debug::{FTP_DEBUG_LOG_LEVEL, FTP_DEBUG_LOG_TARGET, FtpTraceSink, LogTraceSink};

mod error;
pub use error::{FtpControlError, FtpErrorKind, FtpResponseError};

mod config;
pub use config::{FtpControlConfig, FtpDataChannelType, FtpSslMode, FtpTextEncoding};

mod feature;
pub use feature::FtpCapability;

mod event;
pub use event::{FtpEventListener, FtpReplyStatus, FtpSecurityNotAvailable, NoopEventListener};

mod transport;
pub use transport::FtpTransport;

mod control;
pub use control::{FtpCommand, FtpControlChannel, FtpResponse, FtpResponseParser, FtpResponseType};

mod transfer;
pub use transfer::{FtpDataStream, FtpDataStreamProvider, FtpDataType, FtpFileAccess};

mod connection;
pub use connection::{FtpControlConnection, FtpControlGuard, FtpTransfer};

mod time_val;

#[cfg(test)]
mod mock;
