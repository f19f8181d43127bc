/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::ops::{Deref, DerefMut};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

use crate::{
    FtpCapability, FtpControlChannel, FtpControlConfig, FtpControlError, FtpDataStream,
    FtpDataStreamProvider, FtpDataType, FtpFileAccess, FtpResponse, FtpTransport,
};

const NO_LOCK_TIMEOUT: u64 = u64::MAX;

/// Lock wait limit shared by a connection and its guards, in nanoseconds.
#[derive(Debug)]
struct LockTimeout(AtomicU64);

impl LockTimeout {
    fn new(timeout: Option<Duration>) -> Self {
        let v = LockTimeout(AtomicU64::new(NO_LOCK_TIMEOUT));
        v.store(timeout);
        v
    }

    fn store(&self, timeout: Option<Duration>) {
        let nanos = match timeout {
            Some(d) => u64::try_from(d.as_nanos()).unwrap_or(NO_LOCK_TIMEOUT - 1),
            None => NO_LOCK_TIMEOUT,
        };
        self.0.store(nanos, Ordering::Relaxed);
    }

    fn load(&self) -> Option<Duration> {
        match self.0.load(Ordering::Relaxed) {
            NO_LOCK_TIMEOUT => None,
            nanos => Some(Duration::from_nanos(nanos)),
        }
    }
}

/// A control channel shared between tasks.
///
/// Each method holds the channel lock for its whole command sequence. Use
/// [`lock`](Self::lock) to run a custom multi-command transaction. The lock
/// wait limit is `lock_timeout` of the channel config, changes to it take
/// effect once the guard that made them is released.
pub struct FtpControlConnection<T: FtpTransport> {
    channel: Arc<Mutex<FtpControlChannel<T>>>,
    lock_timeout: Arc<LockTimeout>,
}

impl<T: FtpTransport> FtpControlConnection<T> {
    pub fn new(transport: T, config: FtpControlConfig) -> Self {
        FtpControlConnection::from_channel(FtpControlChannel::new(transport, config))
    }

    pub fn from_channel(channel: FtpControlChannel<T>) -> Self {
        let lock_timeout = LockTimeout::new(channel.config().lock_timeout);
        FtpControlConnection {
            channel: Arc::new(Mutex::new(channel)),
            lock_timeout: Arc::new(lock_timeout),
        }
    }

    /// None means wait without limit.
    pub async fn set_lock_timeout(&self, timeout: Option<Duration>) -> Result<(), FtpControlError> {
        self.lock().await?.config_mut().lock_timeout = timeout;
        Ok(())
    }

    /// Get back the channel, fails while a transfer is still open.
    pub fn into_inner(self) -> Result<FtpControlChannel<T>, Self> {
        match Arc::try_unwrap(self.channel) {
            Ok(channel) => Ok(channel.into_inner()),
            Err(channel) => Err(FtpControlConnection {
                channel,
                lock_timeout: self.lock_timeout,
            }),
        }
    }

    /// Take exclusive use of the control channel.
    pub async fn lock(&self) -> Result<FtpControlGuard<'_, T>, FtpControlError> {
        let guard = match self.lock_timeout.load() {
            Some(timeout) => tokio::time::timeout(timeout, self.channel.lock())
                .await
                .map_err(|_| FtpControlError::LockTimedOut)?,
            None => self.channel.lock().await,
        };
        Ok(FtpControlGuard {
            guard,
            lock_timeout: self.lock_timeout.as_ref(),
        })
    }

    async fn lock_owned(&self) -> Result<OwnedMutexGuard<FtpControlChannel<T>>, FtpControlError> {
        let channel = self.channel.clone();
        match self.lock_timeout.load() {
            Some(timeout) => tokio::time::timeout(timeout, channel.lock_owned())
                .await
                .map_err(|_| FtpControlError::LockTimedOut),
            None => Ok(channel.lock_owned().await),
        }
    }

    pub async fn connect(&self) -> Result<(), FtpControlError> {
        self.lock().await?.connect().await
    }

    /// Run a command and return a copy of its reply.
    pub async fn execute(&self, command: &str) -> Result<FtpResponse, FtpControlError> {
        let mut channel = self.lock().await?;
        channel.execute(command).await?;
        Ok(channel.response().clone())
    }

    pub async fn has_capability(&self, flag: FtpCapability) -> Result<bool, FtpControlError> {
        self.lock().await?.has_capability(flag).await
    }

    pub async fn remove_capability(&self, flag: FtpCapability) -> Result<(), FtpControlError> {
        self.lock().await?.remove_capability(flag).await
    }

    pub async fn get_file_size(&self, path: &str) -> u64 {
        match self.lock().await {
            Ok(mut channel) => channel.get_file_size(path).await,
            Err(e) => {
                log_msg!("failed to get size of {}: {}", path, e);
                0
            }
        }
    }

    pub async fn get_modified_time(&self, path: &str) -> Option<DateTime<Utc>> {
        match self.lock().await {
            Ok(mut channel) => channel.get_modified_time(path).await,
            Err(e) => {
                log_msg!("failed to get modification time of {}: {}", path, e);
                None
            }
        }
    }

    /// Open a data stream, the channel stays locked until the returned
    /// transfer is dropped.
    pub async fn open_data_stream<P>(
        &self,
        provider: &P,
        data_type: FtpDataType,
    ) -> Result<FtpTransfer<T, P::Stream>, FtpControlError>
    where
        P: FtpDataStreamProvider<T>,
    {
        let mut channel = self.lock_owned().await?;
        let stream = channel.open_data_stream(provider, data_type).await?;
        Ok(FtpTransfer::new(channel, stream, self.lock_timeout.clone()))
    }

    /// Open a remote file, the channel stays locked until the returned
    /// transfer is dropped.
    pub async fn open_file<P>(
        &self,
        provider: &P,
        path: &str,
        data_type: FtpDataType,
        access: FtpFileAccess,
        offset: u64,
    ) -> Result<FtpTransfer<T, P::Stream>, FtpControlError>
    where
        P: FtpDataStreamProvider<T>,
    {
        let mut channel = self.lock_owned().await?;
        let stream = channel
            .open_file(provider, path, data_type, access, offset)
            .await?;
        Ok(FtpTransfer::new(channel, stream, self.lock_timeout.clone()))
    }

    pub async fn keep_alive(&self) -> Result<bool, FtpControlError> {
        self.lock().await?.keep_alive().await
    }

    /// Close the control connection, this never fails.
    pub async fn disconnect(&self) {
        match self.lock().await {
            Ok(mut channel) => channel.disconnect().await,
            Err(e) => log_msg!("unable to disconnect: {}", e),
        }
    }
}

/// Exclusive use of a shared control channel.
pub struct FtpControlGuard<'a, T: FtpTransport> {
    guard: MutexGuard<'a, FtpControlChannel<T>>,
    lock_timeout: &'a LockTimeout,
}

impl<T: FtpTransport> Deref for FtpControlGuard<'_, T> {
    type Target = FtpControlChannel<T>;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl<T: FtpTransport> DerefMut for FtpControlGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

impl<T: FtpTransport> Drop for FtpControlGuard<'_, T> {
    fn drop(&mut self) {
        self.lock_timeout.store(self.guard.config().lock_timeout);
    }
}

/// An open data stream together with the control channel it belongs to.
///
/// No other command can be sent on the shared connection while the transfer
/// is alive. Read or write the data through the transfer itself, then call
/// [`finish`](Self::finish) to get the final reply of the server.
pub struct FtpTransfer<T: FtpTransport, S: FtpDataStream<T>> {
    control: OwnedMutexGuard<FtpControlChannel<T>>,
    stream: S,
    lock_timeout: Arc<LockTimeout>,
}

impl<T: FtpTransport, S: FtpDataStream<T>> FtpTransfer<T, S> {
    fn new(
        control: OwnedMutexGuard<FtpControlChannel<T>>,
        stream: S,
        lock_timeout: Arc<LockTimeout>,
    ) -> Self {
        FtpTransfer {
            control,
            stream,
            lock_timeout,
        }
    }

    #[inline]
    pub fn stream(&self) -> &S {
        &self.stream
    }

    #[inline]
    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    #[inline]
    pub fn control(&self) -> &FtpControlChannel<T> {
        &self.control
    }

    #[inline]
    pub fn control_mut(&mut self) -> &mut FtpControlChannel<T> {
        &mut self.control
    }

    /// Read the next reply on the control channel, like the final
    /// `226 Transfer complete`.
    pub async fn read_reply(&mut self) -> Result<bool, FtpControlError> {
        self.control.read_reply().await
    }

    /// Wait for the final reply and release the control channel.
    pub async fn finish(mut self) -> Result<FtpResponse, FtpControlError> {
        if self.read_reply().await? {
            Ok(self.control.response().clone())
        } else {
            Err(FtpControlError::CommandFailure(self.control.response().clone()))
        }
    }

    /// Drop the data connection without waiting for the final reply.
    pub async fn abort(mut self) {
        self.stream.dispose().await;
    }
}

impl<T: FtpTransport, S: FtpDataStream<T>> Drop for FtpTransfer<T, S> {
    fn drop(&mut self) {
        self.lock_timeout.store(self.control.config().lock_timeout);
    }
}

impl<T: FtpTransport, S: FtpDataStream<T>> AsyncRead for FtpTransfer<T, S> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_read(cx, buf)
    }
}

impl<T: FtpTransport, S: FtpDataStream<T>> AsyncWrite for FtpTransfer<T, S> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.stream).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_shutdown(cx)
    }
}
