// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for contact submissions.

use serde_json::{json, Value};
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of IP addresses for testing.
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

/// The canonical well-formed submission.
pub fn jane_doe() -> Value {
    json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "subject": "Hello",
        "message": "This is a test message.",
        "honeypot": ""
    })
}

pub fn jane_doe_body() -> Vec<u8> {
    serde_json::to_vec(&jane_doe()).unwrap()
}

/// `jane_doe()` with one field replaced.
pub fn jane_doe_with(field: &str, value: Value) -> Vec<u8> {
    let mut body = jane_doe();
    body[field] = value;
    serde_json::to_vec(&body).unwrap()
}

/// `jane_doe()` with one field removed.
pub fn jane_doe_without(field: &str) -> Vec<u8> {
    let mut body = jane_doe();
    if let Some(map) = body.as_object_mut() {
        map.remove(field);
    }
    serde_json::to_vec(&body).unwrap()
}

/// Bodies a form-filling bot would send: every field set, honeypot included.
pub fn generate_spam_bodies(count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| {
            let honeypot = match i % 4 {
                0 => json!(format!("https://cheap-pills-{i}.example")),
                1 => json!("x"),
                2 => json!(true),
                _ => json!(i + 1),
            };
            jane_doe_with("honeypot", honeypot)
        })
        .collect()
}

/// Bodies that must fail validation, each with a label for failure messages.
pub fn generate_invalid_bodies() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("missing name", jane_doe_without("name")),
        ("missing email", jane_doe_without("email")),
        ("missing subject", jane_doe_without("subject")),
        ("missing message", jane_doe_without("message")),
        ("blank name", jane_doe_with("name", json!("   "))),
        ("email without domain", jane_doe_with("email", json!("jane@"))),
        ("email without tld", jane_doe_with("email", json!("jane@example"))),
        ("email with spaces", jane_doe_with("email", json!("jane doe@example.com"))),
        ("one-letter subject", jane_doe_with("subject", json!("H"))),
        ("short message", jane_doe_with("message", json!("Hi there"))),
        ("padded short message", jane_doe_with("message", json!("   Hi there   "))),
        ("numeric name", jane_doe_with("name", json!(42))),
        ("null email", jane_doe_with("email", json!(null))),
        ("array message", jane_doe_with("message", json!(["a", "b"]))),
        ("json array body", b"[1, 2, 3]".to_vec()),
        ("json string body", br#""hello""#.to_vec()),
        ("json number body", b"42".to_vec()),
    ]
}

/// Bodies that cannot be read as a form at all.
pub fn generate_malformed_bodies() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("not json", b"name=Jane&email=jane@example.com".to_vec()),
        ("truncated json", br#"{"name": "Jane", "email": "#.to_vec()),
        ("unquoted keys", b"{not json}".to_vec()),
        ("empty body", Vec::new()),
        ("json null", b"null".to_vec()),
    ]
}
