// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for contact intake abuse simulation.
//!
//! This module provides stand-in mailers, payload generators and outcome
//! metrics shared by the integration and security tests.

#![allow(dead_code)]

pub mod generators;
pub mod mailers;
pub mod metrics;
