/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use super::{FtpControlConfig, FtpDataChannelType, FtpSslMode, FtpTextEncoding};

fn string(v: &Yaml) -> anyhow::Result<String> {
    match v {
        Yaml::String(s) => Ok(s.clone()),
        Yaml::Integer(i) => Ok(i.to_string()),
        _ => Err(anyhow!("should be a string")),
    }
}

fn flag(v: &Yaml) -> anyhow::Result<bool> {
    match v {
        Yaml::Boolean(b) => Ok(*b),
        Yaml::String(s) if s.eq_ignore_ascii_case("on") => Ok(true),
        Yaml::String(s) if s.eq_ignore_ascii_case("off") => Ok(false),
        _ => Err(anyhow!("should be a boolean")),
    }
}

/// Plain integers are seconds, strings are humanized like `500ms` or `1m`.
fn duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::Integer(i) => Ok(Duration::from_secs(u64::try_from(*i)?)),
        Yaml::String(s) => humanize_rs::duration::parse(s)
            .map_err(|e| anyhow!("invalid duration {s}: {e}")),
        _ => Err(anyhow!("should be a duration")),
    }
}

fn timeout(v: &Yaml) -> anyhow::Result<Duration> {
    let d = duration(v)?;
    if d.is_zero() {
        return Err(anyhow!("should not be zero"));
    }
    Ok(d)
}

fn byte_size(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::Integer(i) => Ok(usize::try_from(*i)?),
        Yaml::String(s) => Ok(s.parse::<humanize_rs::bytes::Bytes>()?.size()),
        _ => Err(anyhow!("should be a byte size")),
    }
}

fn set_key(config: &mut FtpControlConfig, key: &str, v: &Yaml) -> anyhow::Result<()> {
    match key.to_ascii_lowercase().replace('-', "_").as_str() {
        "host" | "server" => config.host = string(v)?,
        "port" => {
            let Yaml::Integer(port) = v else {
                return Err(anyhow!("should be an integer"));
            };
            config.port = u16::try_from(*port)?;
        }
        "username" | "user" => config.username = Some(string(v)?),
        "password" => config.password = Some(string(v)?),
        "ssl_mode" | "tls_mode" => {
            let s = string(v)?;
            config.ssl_mode =
                FtpSslMode::from_str(&s).map_err(|_| anyhow!("invalid ssl mode {s}"))?;
        }
        "data_channel_encryption" | "protect_data_channel" => {
            config.data_channel_encryption = flag(v)?
        }
        "data_channel_type" => {
            let s = string(v)?;
            config.data_channel_type = FtpDataChannelType::from_str(&s)
                .map_err(|_| anyhow!("invalid data channel type {s}"))?;
        }
        "pipelining" => config.pipelining = flag(v)?,
        "keep_alive_interval" => config.keep_alive_interval = duration(v)?,
        "response_read_timeout" | "command_timeout" => {
            config.response_read_timeout = timeout(v)?
        }
        "data_channel_read_timeout" => config.data_channel_read_timeout = timeout(v)?,
        "lock_timeout" => {
            let d = duration(v)?;
            config.lock_timeout = (!d.is_zero()).then_some(d);
        }
        "max_line_len" | "max_line_length" => config.max_line_len = byte_size(v)?,
        "fallback_encoding" | "encoding" => {
            let s = string(v)?;
            config.fallback_encoding = FtpTextEncoding::from_str(&s)
                .map_err(|_| anyhow!("unsupported text encoding {s}"))?;
        }
        _ => return Err(anyhow!("unknown key")),
    }
    Ok(())
}

impl FtpControlConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = value else {
            return Err(anyhow!("ftp control config should be a map"));
        };

        let mut config = FtpControlConfig::default();
        for (k, v) in map {
            let Yaml::String(key) = k else {
                return Err(anyhow!("config key should be a string"));
            };
            set_key(&mut config, key, v).context(format!("invalid value for key {key}"))?;
        }
        Ok(config)
    }
}
