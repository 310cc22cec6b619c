//! CLI Status Command
//!
//! Queries a running gateway's `/api/status` endpoint.

use anyhow::Result;
use llamachat_gateway::status_api::StatusReport;

use crate::console::Console;

pub async fn run(api_url: &str) -> Result<()> {
    let console = Console::detect();
    let url = format!("{}/status", api_url.trim_end_matches('/'));
    let client = reqwest::Client::new();
    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => {
            let report: StatusReport = resp.json().await?;
            print!("{}", format_report(&console, &report));
        }
        Ok(resp) => console.error(&format!("Gateway at `{url}` answered {}", resp.status())),
        Err(_) => console.error(&format!("LlamaChat gateway is not running at `{api_url}`")),
    }
    Ok(())
}

fn format_report(console: &Console, report: &StatusReport) -> String {
    let mut out = format!("\n{} (v{})\n\n", report.status, report.version);
    out.push_str(&format!(
        "  Provider: {} ({})\n  Turns:    {}\n  Uptime:   {}s\n\n",
        report.provider, report.model, report.turns, report.uptime_seconds
    ));

    out.push_str(&console.endpoint_table(&report.endpoints));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_report() {
        let report: StatusReport = serde_json::from_value(serde_json::json!({
            "status": "🦙 Llama AI Chatbot API Running",
            "version": "0.1.0",
            "endpoints": {"chat": "/api/chat", "clear": "/api/clear"},
            "provider": "groq",
            "model": "llama-3.3-70b-versatile",
            "turns": 4,
            "started_at": "2026-01-01T00:00:00Z",
            "uptime_seconds": 12
        }))
        .unwrap();

        let text = format_report(&Console::plain(), &report);
        assert!(text.contains("Llama AI Chatbot API Running (v0.1.0)"));
        assert!(text.contains("groq (llama-3.3-70b-versatile)"));
        assert!(text.contains("  clear     /api/clear\n"));
    }
}
