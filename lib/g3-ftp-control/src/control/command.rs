/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use super::FtpControlChannel;
use crate::{FtpControlError, FtpTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FtpCommand(&'static str);

impl fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

macro_rules! ftp_commands {
    (
        $(
            $(#[$docs:meta])*
            ($konst:ident, $phrase:expr);
        )+
    ) => {
        impl FtpCommand {
        $(
            $(#[$docs])*
            pub const $konst: FtpCommand = FtpCommand($phrase);
        )+
        }
    };
}

ftp_commands! {
    (FEAT, "FEAT");
    (OPTS_UTF8_ON, "OPTS UTF8 ON");
    (USER, "USER");
    (PASS, "PASS");
    (QUIT, "QUIT");
    (NOOP, "NOOP");
    (TYPE_A, "TYPE A");
    (TYPE_I, "TYPE I");
    (AUTH_TLS, "AUTH TLS");
    (AUTH_SSL, "AUTH SSL");
    /// protection buffer size, always 0 for stream mode
    (PBSZ_0, "PBSZ 0");
    (PROT_P, "PROT P");
    (SIZE, "SIZE");
    (MDTM, "MDTM");
    (REST, "REST");
    (RETR, "RETR");
    (STOR, "STOR");
    (APPE, "APPE");
}

impl FtpCommand {
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn with_param(&self, param: &str) -> String {
        format!("{} {param}", self.0)
    }
}

const PASS_REDACTED: &str = "PASS [omitted for security]";

/// The form of a command line that is safe to put into a transcript.
pub(crate) fn trace_form(line: &str) -> &str {
    match line.get(..5) {
        Some(prefix) if prefix.eq_ignore_ascii_case("PASS ") => PASS_REDACTED,
        _ => line,
    }
}

impl<T: FtpTransport> FtpControlChannel<T> {
    pub(super) fn encode_line(&self, line: &str) -> Vec<u8> {
        let mut buf = self.current_encoding().encode(line);
        buf.extend_from_slice(b"\r\n");
        buf
    }

    pub(super) async fn write_line(&mut self, line: &str) -> Result<(), FtpControlError> {
        let buf = self.encode_line(line);
        self.tracer.trace_cmd(trace_form(line));
        self.transport.write_bytes(&buf).await?;
        self.touch();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use crate::{FtpControlConfig, FtpTextEncoding};

    #[test]
    fn command_param() {
        assert_eq!(FtpCommand::SIZE.with_param("/a b.txt"), "SIZE /a b.txt");
        assert_eq!(FtpCommand::TYPE_I.as_str(), "TYPE I");
        assert_eq!(FtpCommand::PROT_P.to_string(), "PROT P");
    }

    #[test]
    fn redact_password() {
        assert_eq!(trace_form("PASS secret"), PASS_REDACTED);
        assert_eq!(trace_form("pass secret"), PASS_REDACTED);
        assert_eq!(trace_form("PASS"), "PASS");
        assert_eq!(trace_form("PASSIVE"), "PASSIVE");
        assert_eq!(trace_form("USER bob"), "USER bob");
    }

    #[test]
    fn line_encoding() {
        let mut config = FtpControlConfig::default();
        config.fallback_encoding = FtpTextEncoding::Latin1;
        let channel = FtpControlChannel::new(MockTransport::connected(&[]), config);
        assert_eq!(channel.encode_line("RETR caf\u{e9}"), b"RETR caf\xe9\r\n");
        assert_eq!(channel.encode_line("RETR \u{4e2d}"), b"RETR ?\r\n");
    }

    #[tokio::test]
    async fn write_raw_bytes() {
        let transport = MockTransport::connected(&[]);
        let mut channel = FtpControlChannel::new(transport.clone(), FtpControlConfig::default());
        channel.write_line("PASS secret").await.unwrap();
        // the literal password reaches the wire
        assert_eq!(transport.written(), vec!["PASS secret"]);
    }
}
