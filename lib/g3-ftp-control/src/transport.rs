/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::time::Duration;

use async_trait::async_trait;

/// Byte level access to the control connection.
///
/// The control channel never touches sockets or TLS directly, everything goes
/// through this trait.
#[async_trait]
pub trait FtpTransport: Send {
    async fn connect(&mut self, host: &str, port: u16) -> io::Result<()>;

    async fn disconnect(&mut self) -> io::Result<()>;

    fn is_connected(&self) -> bool;

    /// Read one line, including the trailing `\n` if found, appending to `buf`.
    ///
    /// At most `max_len` bytes will be read. Return 0 on EOF.
    async fn read_line(&mut self, buf: &mut Vec<u8>, max_len: usize) -> io::Result<usize>;

    async fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    async fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Wait up to `timeout` for the connection to become readable.
    ///
    /// A peer close also counts as readable.
    async fn poll_readable(&mut self, timeout: Duration) -> io::Result<bool>;

    /// Bytes that can be read without blocking.
    fn available_bytes(&self) -> usize;

    async fn upgrade_to_tls(&mut self) -> io::Result<()>;

    fn is_tls_active(&self) -> bool;
}
