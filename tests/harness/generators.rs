// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for abuse simulation.

use serde_json::{json, Value};
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of client addresses for testing.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// A submission that passes every default check.
pub fn valid_submission(i: usize) -> Value {
    json!({
        "name": format!("Visitor {}", i),
        "email": format!("visitor{}@example.com", i),
        "subject": format!("Question number {}", i),
        "message": format!("Hello, this is message number {} about your work.", i),
    })
}

/// Submissions that must fail validation, one per failure kind.
pub fn invalid_submissions() -> Vec<Value> {
    vec![
        // Missing field
        json!({ "name": "Ada", "email": "ada@example.com", "subject": "Hello" }),
        // Wrong type
        json!({ "name": ["Ada"], "email": "ada@example.com", "subject": "Hello", "message": "0123456789" }),
        // Too short
        json!({ "name": "A", "email": "ada@example.com", "subject": "Hello", "message": "0123456789" }),
        // Too long
        json!({ "name": "Ada", "email": "ada@example.com", "subject": "Hello", "message": "x".repeat(2001) }),
        // Bad syntax
        json!({ "name": "Ada", "email": "ada.example.com", "subject": "Hello", "message": "0123456789" }),
        // Blocked domain
        json!({ "name": "Ada", "email": "ada@guerrillamail.com", "subject": "Hello", "message": "0123456789" }),
        // Spam
        json!({ "name": "Ada", "email": "ada@example.com", "subject": "Hello", "message": "Click HERE now for prizes" }),
    ]
}

/// Spam phrasing variants the default patterns should catch.
pub fn spam_messages() -> Vec<&'static str> {
    vec![
        "Cheap VIAGRA available today",
        "Best online casino bonuses",
        "You are our lottery pick",
        "You are a WINNER, claim now",
        "Congratulations! You have won one million dollars",
        "Click right here, act now",
        "Get free cash money instantly",
        "Earn $5000 working from home fast",
    ]
}

/// Disposable addresses with case variations.
pub fn blocked_addresses() -> Vec<&'static str> {
    vec![
        "a@10minutemail.com",
        "b@TEMPMAIL.org",
        "c@GuerrillaMail.com",
        "d@mailinator.COM",
    ]
}

/// Markup injection payloads.
pub fn injection_payloads() -> Vec<&'static str> {
    vec![
        "<script>alert('x')</script> please reply",
        "<img src=x onerror=alert(1)> hello there",
        "\"><iframe src=\"https://evil.example\"></iframe>",
        "Tom & Jerry's <b>bold</b> question here",
    ]
}
