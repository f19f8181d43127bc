/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod response;
pub use response::FtpResponseError;

mod control;
pub use control::{FtpControlError, FtpErrorKind};
