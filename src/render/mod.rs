//! Fills the embedded dashboard template. No decisions are made here beyond
//! ON/OFF for the debug flag; every value arrives already formatted.

use crate::config::DeploymentConfig;

const STATUS_TEMPLATE: &str = include_str!("status.html");

/// Request-time view of the environment. Built fresh for every render.
#[derive(Debug, Clone)]
pub struct EnvironmentSnapshot {
    pub environment: String,
    pub debug: bool,
    pub server_software: String,
    pub runtime_version: String,
    pub hostname: String,
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct StatusPage<'a> {
    pub env: EnvironmentSnapshot,
    pub deployment: &'a DeploymentConfig,
    pub uptime: String,
    pub memory: String,
}

pub fn render_status_page(page: &StatusPage<'_>) -> String {
    let d = page.deployment;
    let env = &page.env;
    fill_template(STATUS_TEMPLATE, |key| {
        let value = match key {
            "title" => escape_html(&d.title),
            "subtitle" => escape_html(&d.subtitle),
            "environment" => escape_html(&env.environment),
            "debug" => (if env.debug { "ON" } else { "OFF" }).to_string(),
            "container" => escape_html(&d.container),
            "orchestrator" => escape_html(&d.orchestrator),
            "replicas" => d.replicas.to_string(),
            "reverse_proxy" => escape_html(&d.reverse_proxy),
            "load_balancer" => escape_html(&d.load_balancer),
            "port_mapping" => escape_html(&d.port_mapping),
            "server_software" => escape_html(&env.server_software),
            "runtime_version" => escape_html(&env.runtime_version),
            "hostname" => escape_html(&env.hostname),
            "timestamp" => escape_html(&env.timestamp),
            "uptime" => escape_html(&page.uptime),
            "memory" => escape_html(&page.memory),
            "footer" => escape_html(&d.footer),
            "badges" => d
                .badges
                .iter()
                .map(|b| format!("                <span class=\"badge\">{}</span>", escape_html(b)))
                .collect::<Vec<_>>()
                .join("\n"),
            _ => return None,
        };
        Some(value)
    })
}

/// Single pass over `{{key}}` markers, so substituted text is never rescanned.
/// Unknown keys are left in place.
fn fill_template(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len() + 512);
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match lookup(key) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
