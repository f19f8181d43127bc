/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use log::Level;

pub const FTP_DEBUG_LOG_LEVEL: Level = Level::Debug;
pub const FTP_DEBUG_LOG_TARGET: &str = "ftp";

#[macro_export]
macro_rules! log_msg {
    ($s:literal, $($arg:tt)+) => (
        log::log!(target: $crate::FTP_DEBUG_LOG_TARGET, $crate::FTP_DEBUG_LOG_LEVEL, concat!(": ", $s), $($arg)+)
    )
}

/// Receiver of the control channel transcript.
///
/// Sent commands are prefixed with `< `, received lines with `> `.
pub trait FtpTraceSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Trace sink that forwards the transcript to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogTraceSink;

impl FtpTraceSink for LogTraceSink {
    fn write_line(&self, line: &str) {
        log::log!(target: FTP_DEBUG_LOG_TARGET, FTP_DEBUG_LOG_LEVEL, "{line}");
    }
}

pub(crate) type FtpLogTransform = dyn Fn(&str) -> String + Send + Sync;

#[derive(Clone)]
pub(crate) struct FtpTracer {
    sink: Arc<dyn FtpTraceSink>,
    transform: Option<Arc<FtpLogTransform>>,
}

impl Default for FtpTracer {
    fn default() -> Self {
        FtpTracer {
            sink: Arc::new(LogTraceSink),
            transform: None,
        }
    }
}

impl FtpTracer {
    pub(crate) fn set_sink(&mut self, sink: Arc<dyn FtpTraceSink>) {
        self.sink = sink;
    }

    pub(crate) fn set_transform(&mut self, transform: Option<Arc<FtpLogTransform>>) {
        self.transform = transform;
    }

    #[inline]
    pub(crate) fn trace_cmd(&self, cmd: &str) {
        self.emit(format!("< {cmd}"));
    }

    #[inline]
    pub(crate) fn trace_rsp(&self, rsp: &str) {
        self.emit(format!("> {rsp}"));
    }

    fn emit(&self, line: String) {
        match &self.transform {
            Some(f) => self.sink.write_line(&f(&line)),
            None => self.sink.write_line(&line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::CollectingSink;

    #[test]
    fn prefix() {
        let sink = Arc::new(CollectingSink::default());
        let mut tracer = FtpTracer::default();
        tracer.set_sink(sink.clone());
        tracer.trace_cmd("NOOP");
        tracer.trace_rsp("200 OK");
        assert_eq!(sink.lines(), vec!["< NOOP", "> 200 OK"]);
    }

    #[test]
    fn transform() {
        let sink = Arc::new(CollectingSink::default());
        let mut tracer = FtpTracer::default();
        tracer.set_sink(sink.clone());
        tracer.set_transform(Some(Arc::new(|line: &str| format!("[ctl] {line}"))));
        tracer.trace_cmd("FEAT");
        assert_eq!(sink.lines(), vec!["[ctl] < FEAT"]);

        tracer.set_transform(None);
        tracer.trace_cmd("FEAT");
        assert_eq!(sink.lines(), vec!["[ctl] < FEAT", "< FEAT"]);
    }
}
