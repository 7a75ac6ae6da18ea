// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Abuse patterns for security testing.

/// Abuse pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of submissions to send
    pub total_requests: usize,
    /// Number of unique IPs to simulate
    pub unique_ips: usize,
    /// Fraction of submissions with the honeypot filled (0.0-1.0)
    pub spam_ratio: f64,
    /// Fraction of submissions with broken fields (0.0-1.0)
    pub invalid_ratio: f64,
    /// Send everything at once instead of one after another
    pub concurrent: bool,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 50,
            unique_ips: 1,
            spam_ratio: 0.0,
            invalid_ratio: 0.0,
            concurrent: false,
        }
    }
}

/// Predefined abuse patterns.
impl AttackConfig {
    /// One client hammering the form.
    pub fn single_ip_flood() -> Self {
        Self {
            total_requests: 100,
            ..Default::default()
        }
    }

    /// One client firing everything in parallel, probing for counter races.
    pub fn concurrent_burst() -> Self {
        Self {
            total_requests: 64,
            concurrent: true,
            ..Default::default()
        }
    }

    /// Many clients, a few submissions each.
    pub fn distributed_flood() -> Self {
        Self {
            total_requests: 500,
            unique_ips: 100,
            ..Default::default()
        }
    }

    /// A bot that fills in every field it sees.
    pub fn spam_bot() -> Self {
        Self {
            total_requests: 40,
            unique_ips: 40,
            spam_ratio: 1.0,
            ..Default::default()
        }
    }

    /// Mixed traffic: some spam, some garbage, some real.
    pub fn mixed() -> Self {
        Self {
            total_requests: 300,
            unique_ips: 150,
            spam_ratio: 0.3,
            invalid_ratio: 0.3,
            ..Default::default()
        }
    }

    /// Upper bound on notifications this pattern may cause.
    pub fn max_deliveries(&self, max_requests: u32) -> usize {
        self.unique_ips.min(self.total_requests) * max_requests as usize
    }
}

/// Simple deterministic "random" based on index and ratio.
pub fn rand_bool(ratio: f64, index: usize) -> bool {
    if ratio >= 1.0 {
        true
    } else if ratio <= 0.0 {
        false
    } else {
        (index as f64 * 0.618033988749895) % 1.0 < ratio
    }
}
