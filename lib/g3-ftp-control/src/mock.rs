/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::{
    FtpCommand, FtpControlChannel, FtpControlError, FtpDataStream, FtpDataStreamProvider,
    FtpEventListener, FtpReplyStatus, FtpSecurityNotAvailable, FtpTraceSink, FtpTransport,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum MockEvent {
    Connect,
    Read(String),
    Write(String),
    UpgradeTls,
    Disconnect,
}

#[derive(Default)]
struct MockState {
    replies: VecDeque<String>,
    stale: Vec<u8>,
    events: Vec<MockEvent>,
    write_calls: usize,
    connect_count: usize,
    connected: bool,
    tls: bool,
    stall: bool,
    peer_closed: bool,
}

enum NextLine {
    Line(String),
    Eof,
    Stall,
}

fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "mock transport not connected")
}

/// Scripted control connection, clones share the same state.
#[derive(Clone, Default)]
pub(crate) struct MockTransport(Arc<Mutex<MockState>>);

impl MockTransport {
    pub(crate) fn new(replies: &[&str]) -> Self {
        let transport = MockTransport::default();
        transport.push_replies(replies);
        transport
    }

    pub(crate) fn connected(replies: &[&str]) -> Self {
        let transport = MockTransport::new(replies);
        transport.state().connected = true;
        transport
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.0.lock().unwrap()
    }

    pub(crate) fn push_replies(&self, replies: &[&str]) {
        let mut state = self.state();
        state.replies.extend(replies.iter().map(|s| s.to_string()));
    }

    pub(crate) fn push_stale(&self, data: &[u8]) {
        self.state().stale.extend_from_slice(data);
    }

    /// Let the next line read block forever.
    pub(crate) fn stall(&self) {
        self.state().stall = true;
    }

    pub(crate) fn set_peer_closed(&self, closed: bool) {
        self.state().peer_closed = closed;
    }

    pub(crate) fn events(&self) -> Vec<MockEvent> {
        self.state().events.clone()
    }

    /// All command lines written, without line terminator.
    pub(crate) fn written(&self) -> Vec<String> {
        self.state()
            .events
            .iter()
            .filter_map(|e| match e {
                MockEvent::Write(line) => Some(line.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn write_calls(&self) -> usize {
        self.state().write_calls
    }

    pub(crate) fn connect_count(&self) -> usize {
        self.state().connect_count
    }

    fn next_line(&self) -> io::Result<NextLine> {
        let mut state = self.state();
        if !state.connected {
            return Err(not_connected());
        }
        if state.stall {
            return Ok(NextLine::Stall);
        }
        match state.replies.pop_front() {
            Some(line) => {
                state.events.push(MockEvent::Read(line.clone()));
                Ok(NextLine::Line(line))
            }
            None => Ok(NextLine::Eof),
        }
    }
}

#[async_trait]
impl FtpTransport for MockTransport {
    async fn connect(&mut self, _host: &str, _port: u16) -> io::Result<()> {
        let mut state = self.state();
        state.connected = true;
        state.tls = false;
        state.peer_closed = false;
        state.connect_count += 1;
        state.events.push(MockEvent::Connect);
        Ok(())
    }

    async fn disconnect(&mut self) -> io::Result<()> {
        let mut state = self.state();
        state.connected = false;
        state.tls = false;
        state.events.push(MockEvent::Disconnect);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state().connected
    }

    async fn read_line(&mut self, buf: &mut Vec<u8>, max_len: usize) -> io::Result<usize> {
        match self.next_line()? {
            NextLine::Line(line) => {
                let data = format!("{line}\r\n");
                let len = data.len().min(max_len);
                buf.extend_from_slice(&data.as_bytes()[..len]);
                Ok(len)
            }
            NextLine::Eof => Ok(0),
            NextLine::Stall => std::future::pending().await,
        }
    }

    async fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state();
        if !state.connected {
            return Err(not_connected());
        }
        let len = state.stale.len().min(buf.len());
        buf[..len].copy_from_slice(&state.stale[..len]);
        state.stale.drain(..len);
        Ok(len)
    }

    async fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
        let mut state = self.state();
        if !state.connected {
            return Err(not_connected());
        }
        state.write_calls += 1;
        let text = String::from_utf8_lossy(buf);
        for line in text.split("\r\n").filter(|l| !l.is_empty()) {
            state.events.push(MockEvent::Write(line.to_string()));
        }
        Ok(())
    }

    async fn poll_readable(&mut self, _timeout: Duration) -> io::Result<bool> {
        let state = self.state();
        if !state.connected {
            return Err(not_connected());
        }
        Ok(state.peer_closed || !state.stale.is_empty())
    }

    fn available_bytes(&self) -> usize {
        let state = self.state();
        if state.peer_closed { 0 } else { state.stale.len() }
    }

    async fn upgrade_to_tls(&mut self) -> io::Result<()> {
        let mut state = self.state();
        if !state.connected {
            return Err(not_connected());
        }
        state.tls = true;
        state.events.push(MockEvent::UpgradeTls);
        Ok(())
    }

    fn is_tls_active(&self) -> bool {
        self.state().tls
    }
}

#[derive(Default)]
pub(crate) struct CollectingSink {
    lines: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub(crate) fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl FtpTraceSink for CollectingSink {
    fn write_line(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}

#[derive(Default)]
pub(crate) struct RecordingListener {
    replies: Mutex<Vec<(String, String)>>,
    security_events: AtomicUsize,
    cancel: bool,
}

impl RecordingListener {
    pub(crate) fn cancelling() -> Self {
        RecordingListener {
            cancel: true,
            ..Default::default()
        }
    }

    pub(crate) fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }

    pub(crate) fn security_events(&self) -> usize {
        self.security_events.load(Ordering::Relaxed)
    }
}

impl FtpEventListener for RecordingListener {
    fn on_reply(&self, status: FtpReplyStatus<'_>, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push((status.to_string(), message.to_string()));
    }

    fn on_security_not_available(&self, event: &mut FtpSecurityNotAvailable) {
        self.security_events.fetch_add(1, Ordering::Relaxed);
        if self.cancel {
            event.cancel();
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockDataStreamProvider {
    log: Arc<Mutex<Vec<String>>>,
    payload: Vec<u8>,
}

impl MockDataStreamProvider {
    pub(crate) fn with_payload(payload: &[u8]) -> Self {
        MockDataStreamProvider {
            log: Arc::default(),
            payload: payload.to_vec(),
        }
    }

    pub(crate) fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn new_stream(&self, name: &str) -> MockDataStream {
        self.log.lock().unwrap().push(name.to_string());
        let mut builder = tokio_test::io::Builder::new();
        if !self.payload.is_empty() {
            builder.read(&self.payload);
        }
        MockDataStream {
            io: builder.build(),
            log: self.log.clone(),
            read_timeout: None,
            expected_length: 0,
            offset: 0,
        }
    }
}

impl<T: FtpTransport> FtpDataStreamProvider<T> for MockDataStreamProvider {
    type Stream = MockDataStream;

    fn passive_stream(&self, extended: bool) -> MockDataStream {
        if extended {
            self.new_stream("new passive extended")
        } else {
            self.new_stream("new passive")
        }
    }

    fn active_stream(&self, extended: bool) -> MockDataStream {
        if extended {
            self.new_stream("new active extended")
        } else {
            self.new_stream("new active")
        }
    }
}

#[derive(Debug)]
pub(crate) struct MockDataStream {
    io: tokio_test::io::Mock,
    log: Arc<Mutex<Vec<String>>>,
    read_timeout: Option<Duration>,
    expected_length: u64,
    offset: u64,
}

impl MockDataStream {
    pub(crate) fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    pub(crate) fn expected_length(&self) -> u64 {
        self.expected_length
    }

    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }
}

impl AsyncRead for MockDataStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.io).poll_read(cx, buf)
    }
}

impl AsyncWrite for MockDataStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.io).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.io).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.io).poll_shutdown(cx)
    }
}

#[async_trait]
impl<T: FtpTransport> FtpDataStream<T> for MockDataStream {
    fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = Some(timeout);
    }

    fn set_expected_length(&mut self, len: u64) {
        self.expected_length = len;
    }

    fn seek(&mut self, offset: u64) {
        self.offset = offset;
    }

    async fn execute(
        &mut self,
        control: &mut FtpControlChannel<T>,
        command: &str,
    ) -> Result<bool, FtpControlError> {
        if self.offset > 0 {
            let rest = FtpCommand::REST.with_param(&self.offset.to_string());
            if !control.execute(&rest).await? {
                return Ok(false);
            }
        }
        control.execute(command).await
    }

    async fn dispose(&mut self) {
        self.log.lock().unwrap().push("dispose".to_string());
    }
}
