/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use bitflags::bitflags;

bitflags! {
    /// Server capabilities discovered through `FEAT`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FtpCapability: u16 {
        const EPSV = 1 << 0;
        const EPRT = 1 << 1;
        const MLST = 1 << 2;
        const MLSD = 1 << 3;
        const MDTM = 1 << 4;
        const MDTMDIR = 1 << 5;
        const REST = 1 << 6;
        const SIZE = 1 << 7;
        const UTF8 = 1 << 8;
        const PRET = 1 << 9;
    }
}

impl FtpCapability {
    /// Map one feature line of a `FEAT` reply.
    ///
    /// Only the first matching keyword counts, so that `MLST size*;modify*;`
    /// does not also turn on `SIZE`.
    pub fn from_feature_line(line: &str) -> FtpCapability {
        let line = line.trim().to_ascii_uppercase();
        if line.contains("MLST") || line.contains("MLSD") {
            FtpCapability::MLST | FtpCapability::MLSD
        } else if line.contains("MDTM") {
            FtpCapability::MDTM | FtpCapability::MDTMDIR
        } else if line.contains("REST STREAM") {
            FtpCapability::REST
        } else if line.contains("SIZE") {
            FtpCapability::SIZE
        } else if line.contains("UTF8") {
            FtpCapability::UTF8
        } else if line.contains("PRET") {
            FtpCapability::PRET
        } else {
            FtpCapability::empty()
        }
    }

    /// Build the capability set from the info lines of a positive `FEAT` reply.
    ///
    /// Extended data channel commands are assumed to be present once a server
    /// answers `FEAT` at all.
    pub fn from_feat_reply<S: AsRef<str>>(info_lines: &[S]) -> FtpCapability {
        info_lines
            .iter()
            .fold(FtpCapability::EPSV | FtpCapability::EPRT, |acc, line| {
                acc | FtpCapability::from_feature_line(line.as_ref())
            })
    }
}
