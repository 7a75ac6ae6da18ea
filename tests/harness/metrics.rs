// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Metrics collection for abuse simulation results.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// Collects outcomes during an abuse simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    /// Count of submissions by pipeline outcome label
    outcomes: HashMap<&'static str, usize>,
    /// Successful deliveries by client
    delivered_per_ip: HashMap<String, usize>,
    /// Every client seen
    ips: HashSet<String>,
    /// Distinct client-visible messages
    messages: HashSet<&'static str>,
}

impl AttackMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one submission outcome.
    pub fn record(&mut self, outcome: &'static str, message: &'static str, ip: &str) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        self.ips.insert(ip.to_string());
        self.messages.insert(message);
        if outcome == "sent" {
            *self.delivered_per_ip.entry(ip.to_string()).or_insert(0) += 1;
        }
    }

    /// Get total submission count.
    pub fn total(&self) -> usize {
        self.outcomes.values().sum()
    }

    /// Get count for a specific outcome.
    pub fn count(&self, outcome: &str) -> usize {
        self.outcomes.get(outcome).copied().unwrap_or(0)
    }

    /// Most deliveries any one client achieved.
    pub fn max_delivered_per_ip(&self) -> usize {
        self.delivered_per_ip.values().copied().max().unwrap_or(0)
    }

    pub fn unique_ips(&self) -> usize {
        self.ips.len()
    }

    pub fn messages(&self) -> &HashSet<&'static str> {
        &self.messages
    }
}

impl fmt::Display for AttackMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Abuse Simulation ===")?;
        writeln!(f, "Submissions: {}", self.total())?;
        writeln!(f, "Unique IPs: {}", self.unique_ips())?;
        let mut outcomes: Vec<_> = self.outcomes.iter().collect();
        outcomes.sort();
        for (outcome, count) in outcomes {
            writeln!(f, "  {outcome}: {count}")?;
        }
        write!(f, "Max deliveries per IP: {}", self.max_delivered_per_ip())
    }
}
