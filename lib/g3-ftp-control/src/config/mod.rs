/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "yaml")]
mod yaml;

const DEFAULT_RESPONSE_READ_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_DATA_CHANNEL_READ_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_MAX_LINE_LEN: usize = 2048;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FtpSslMode {
    #[default]
    None,
    /// AUTH TLS after the plaintext greeting
    Explicit,
    /// TLS from the first byte
    Implicit,
}

impl FromStr for FtpSslMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "plain" => Ok(FtpSslMode::None),
            "explicit" | "auth_tls" => Ok(FtpSslMode::Explicit),
            "implicit" => Ok(FtpSslMode::Implicit),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FtpDataChannelType {
    Active,
    #[default]
    Passive,
    ExtendedActive,
    ExtendedPassive,
}

impl FtpDataChannelType {
    pub fn is_passive(&self) -> bool {
        matches!(
            self,
            FtpDataChannelType::Passive | FtpDataChannelType::ExtendedPassive
        )
    }

    pub fn is_extended(&self) -> bool {
        matches!(
            self,
            FtpDataChannelType::ExtendedActive | FtpDataChannelType::ExtendedPassive
        )
    }
}

impl FromStr for FtpDataChannelType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "active" | "port" => Ok(FtpDataChannelType::Active),
            "passive" | "pasv" => Ok(FtpDataChannelType::Passive),
            "extended_active" | "eprt" => Ok(FtpDataChannelType::ExtendedActive),
            "extended_passive" | "epsv" => Ok(FtpDataChannelType::ExtendedPassive),
            _ => Err(()),
        }
    }
}

/// Text encoding of the control channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FtpTextEncoding {
    Utf8,
    /// ISO-8859-1, unmappable chars are sent as `?`
    #[default]
    Latin1,
}

impl FtpTextEncoding {
    pub fn encode(&self, s: &str) -> Vec<u8> {
        match self {
            FtpTextEncoding::Utf8 => s.as_bytes().to_vec(),
            FtpTextEncoding::Latin1 => s
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
        }
    }

    pub fn decode(&self, b: &[u8]) -> String {
        match self {
            FtpTextEncoding::Utf8 => String::from_utf8_lossy(b).into_owned(),
            FtpTextEncoding::Latin1 => b.iter().map(|&c| char::from(c)).collect(),
        }
    }
}

impl FromStr for FtpTextEncoding {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf8" | "utf-8" => Ok(FtpTextEncoding::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(FtpTextEncoding::Latin1),
            _ => Err(()),
        }
    }
}

#[derive(Clone)]
pub struct FtpControlConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ssl_mode: FtpSslMode,
    pub data_channel_encryption: bool,
    pub data_channel_type: FtpDataChannelType,
    /// allow batched writes of outgoing commands, replies are still read in order
    pub pipelining: bool,
    /// zero means disabled
    pub keep_alive_interval: Duration,
    pub response_read_timeout: Duration,
    pub data_channel_read_timeout: Duration,
    /// None means wait without limit
    pub lock_timeout: Option<Duration>,
    pub max_line_len: usize,
    /// used until the server confirmed UTF-8 support
    pub fallback_encoding: FtpTextEncoding,
}

impl Default for FtpControlConfig {
    fn default() -> Self {
        FtpControlConfig {
            host: String::new(),
            port: 21,
            username: None,
            password: None,
            ssl_mode: FtpSslMode::None,
            data_channel_encryption: false,
            data_channel_type: FtpDataChannelType::Passive,
            pipelining: false,
            keep_alive_interval: Duration::ZERO,
            response_read_timeout: DEFAULT_RESPONSE_READ_TIMEOUT,
            data_channel_read_timeout: DEFAULT_DATA_CHANNEL_READ_TIMEOUT,
            lock_timeout: None,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            fallback_encoding: FtpTextEncoding::Latin1,
        }
    }
}

impl FtpControlConfig {
    pub fn new(host: &str, port: u16) -> Self {
        FtpControlConfig {
            host: host.to_string(),
            port,
            ..Default::default()
        }
    }

    pub fn set_credentials(&mut self, username: &str, password: Option<&str>) {
        self.username = Some(username.to_string());
        self.password = password.map(|s| s.to_string());
    }
}

impl fmt::Debug for FtpControlConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FtpControlConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("ssl_mode", &self.ssl_mode)
            .field("data_channel_encryption", &self.data_channel_encryption)
            .field("data_channel_type", &self.data_channel_type)
            .field("pipelining", &self.pipelining)
            .field("keep_alive_interval", &self.keep_alive_interval)
            .field("response_read_timeout", &self.response_read_timeout)
            .field("data_channel_read_timeout", &self.data_channel_read_timeout)
            .field("lock_timeout", &self.lock_timeout)
            .field("max_line_len", &self.max_line_len)
            .field("fallback_encoding", &self.fallback_encoding)
            .finish()
    }
}
