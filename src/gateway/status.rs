//! Status page
//!
//! Renders uptime, resident memory and the usage counters of this worker
//! into an HTML template with `{{uptime}}`, `{{ram}}`, `{{requests}}` and
//! `{{usage}}` placeholders.

use crate::gateway::StatsSnapshot;
use std::path::Path;
use std::time::Instant;

const DEFAULT_TEMPLATE: &str = include_str!("status.html");

pub struct StatusPage {
    template: String,
    started: Instant,
}

/// Values substituted into the template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub uptime: String,
    pub ram: String,
    pub requests: u64,
    pub usage: String,
}

impl StatusPage {
    pub fn new(template: String) -> Self {
        Self {
            template,
            started: Instant::now(),
        }
    }

    /// Load the configured template, or use the embedded one
    pub fn load(template: Option<&Path>) -> std::io::Result<Self> {
        let template = match template {
            Some(path) => std::fs::read_to_string(path)?,
            None => DEFAULT_TEMPLATE.to_string(),
        };
        Ok(Self::new(template))
    }

    pub async fn snapshot(&self, stats: &StatsSnapshot) -> StatusSnapshot {
        StatusSnapshot {
            uptime: format_uptime(self.started.elapsed().as_secs_f64()),
            ram: resident_memory_bytes()
                .await
                .map_or_else(|| "n/a".to_string(), format_mib),
            requests: stats.requests,
            usage: format_usage(&stats.cmds),
        }
    }

    pub async fn render(&self, stats: &StatsSnapshot) -> String {
        render_template(&self.template, &self.snapshot(stats).await)
    }
}

pub fn render_template(template: &str, snapshot: &StatusSnapshot) -> String {
    template
        .replace("{{uptime}}", &snapshot.uptime)
        .replace("{{ram}}", &snapshot.ram)
        .replace("{{requests}}", &snapshot.requests.to_string())
        .replace("{{usage}}", &snapshot.usage)
}

/// `[DD:][HH:]MM:SS`, hours shown once an hour or a day has passed
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_uptime(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let days = total / 86_400;
    let hours = total % 86_400 / 3_600;
    let minutes = total % 3_600 / 60;
    let secs = total % 60;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{days:02}:"));
    }
    if hours > 0 || days > 0 {
        out.push_str(&format!("{hours:02}:"));
    }
    out.push_str(&format!("{minutes:02}:{secs:02}"));
    out
}

#[allow(clippy::cast_precision_loss)]
pub fn format_mib(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / 1024.0 / 1024.0)
}

/// `"<cmd> - <n> hits"` lines joined with `<br>`
pub fn format_usage(cmds: &[(String, u64)]) -> String {
    cmds.iter()
        .map(|(name, hits)| format!("{name} - {hits} hits"))
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Resident set size of this process, where the platform exposes it
pub async fn resident_memory_bytes() -> Option<u64> {
    let status = tokio::fs::read_to_string("/proc/self/status").await.ok()?;
    parse_vm_rss(&status)
}

fn parse_vm_rss(status: &str) -> Option<u64> {
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kib: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kib * 1024)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0.0), "00:00");
        assert_eq!(format_uptime(125.0), "02:05");
        assert_eq!(format_uptime(3725.0), "01:02:05");
        assert_eq!(format_uptime(86_400.0), "01:00:00:00");
        assert_eq!(format_uptime(90_061.0), "01:01:01:01");
        assert_eq!(format_uptime(12.0 * 86_400.0 + 5.0), "12:00:00:05");
    }

    #[test]
    fn test_format_uptime_rounds_before_splitting() {
        assert_eq!(format_uptime(59.6), "01:00");
        assert_eq!(format_uptime(3599.5), "01:00:00");
    }

    #[test]
    fn test_parse_vm_rss() {
        let status = "Name:\tapigate\nVmPeak:\t  10000 kB\nVmRSS:\t    2048 kB\nThreads:\t1\n";
        assert_eq!(parse_vm_rss(status), Some(2 * 1024 * 1024));
        assert_eq!(parse_vm_rss("Name:\tapigate\n"), None);
        assert_eq!(format_mib(2 * 1024 * 1024), "2.00");
        assert_eq!(format_mib(1_572_864), "1.50");
    }

    #[test]
    fn test_format_usage() {
        let cmds = vec![("upper".to_string(), 3), ("echo".to_string(), 0)];
        assert_eq!(format_usage(&cmds), "upper - 3 hits<br>echo - 0 hits");
        assert_eq!(format_usage(&[]), "");
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_resident_memory_of_self() {
        let rss = resident_memory_bytes().await.unwrap();
        assert!(rss > 0);
    }

    #[tokio::test]
    async fn test_render_template() {
        let page = StatusPage::new(
            "<p>{{uptime}}</p><p>{{ram}}</p><p>{{requests}}</p><p>{{usage}}</p>".to_string(),
        );
        let stats = StatsSnapshot {
            requests: 7,
            cmds: vec![("echo".to_string(), 5)],
        };
        let html = page.render(&stats).await;
        assert!(html.starts_with("<p>00:00</p>"));
        assert!(html.contains("<p>7</p>"));
        assert!(html.ends_with("<p>echo - 5 hits</p>"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_embedded_template_has_placeholders() {
        for placeholder in ["{{uptime}}", "{{ram}}", "{{requests}}", "{{usage}}"] {
            assert!(DEFAULT_TEMPLATE.contains(placeholder), "{placeholder}");
        }
    }
}
