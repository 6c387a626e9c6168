//! Resource limits from `ExtraParams`
//!
//! unRAID stores `docker run` flags as free text. Only `--cpus`,
//! `--cpu-shares` and `--memory` are picked out; the first match of each
//! flag wins and everything else in the string is ignored.

use regex::Regex;
use std::sync::LazyLock;

static CPUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--cpus=([0-9.]+)").expect("valid regex"));

static CPU_SHARES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--cpu-shares=([0-9]+)").expect("valid regex"));

static MEMORY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)--memory=([0-9]+[kmg]?)").expect("valid regex"));

/// Resource limits found in a template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceLimits {
    /// `--cpus` value, verbatim
    pub cpus: Option<String>,
    /// `--cpu-shares` value
    pub cpu_shares: Option<u64>,
    /// `--memory` value, verbatim (suffix case preserved)
    pub memory: Option<String>,
    /// `CPUset` element
    pub cpuset: Option<String>,
}

impl ResourceLimits {
    /// Extract limits from an `ExtraParams` string and a `CPUset` value
    pub fn parse(extra_params: &str, cpuset: Option<&str>) -> Self {
        let cpu_shares = first_capture(&CPU_SHARES_RE, extra_params).and_then(|raw| {
            raw.parse::<u64>()
                .map_err(|e| tracing::warn!("Ignoring --cpu-shares={}: {}", raw, e))
                .ok()
        });

        Self {
            cpus: first_capture(&CPUS_RE, extra_params).map(str::to_string),
            cpu_shares,
            memory: first_capture(&MEMORY_RE, extra_params).map(str::to_string),
            cpuset: cpuset.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }

    /// Whether cpu or memory limits need a `deploy.resources.limits` block
    pub fn has_deploy_limits(&self) -> bool {
        self.cpus.is_some() || self.memory.is_some()
    }
}

fn first_capture<'a>(re: &Regex, haystack: &'a str) -> Option<&'a str> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
