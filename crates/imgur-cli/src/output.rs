//! Output formatting for imgur-cli (table, json)

use clap::ValueEnum;
use colored::Colorize;
use imgur_client::{ErrorData, SuccessData};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Key/value table (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format, quiet }
    }

    /// Progress lines go to stdout, so they are suppressed when stdout carries JSON
    pub fn shows_progress(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Table
    }

    /// Print a success message (unless in quiet mode)
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.green());
        }
    }

    /// Print an info message (unless in quiet mode)
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    /// Print an error message
    pub fn error(&self, msg: &str) {
        eprintln!("{}", msg.red());
    }

    /// Print a serializable value as JSON
    pub fn print_json<T: Serialize>(&self, value: &T) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
        );
    }

    /// Print key-value pairs in the configured format
    pub fn print_kv(&self, pairs: &[(&str, String)]) {
        match self.format {
            OutputFormat::Table => println!("{}", kv_table(pairs)),
            OutputFormat::Json => {
                let map: serde_json::Map<String, serde_json::Value> = pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.clone())))
                    .collect();
                self.print_json(&map);
            }
        }
    }
}

fn kv_table(pairs: &[(&str, String)]) -> String {
    let mut builder = Builder::default();
    for (key, value) in pairs {
        builder.push_record([key.to_string(), value.clone()]);
    }
    builder.build().with(Style::rounded()).to_string()
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

/// Rows shown for an uploaded image
pub fn success_pairs(data: &SuccessData) -> Vec<(&'static str, String)> {
    vec![
        ("ID", data.id.clone()),
        ("Link", data.link.clone()),
        ("Delete hash", or_dash(data.deletehash.as_deref())),
        ("Title", or_dash(data.title.as_deref())),
        ("Type", data.media_type.clone()),
        ("Size", format!("{}x{}, {} bytes", data.width, data.height, data.size)),
        ("Animated", data.animated.to_string()),
    ]
}

/// Rows shown for a rejected request
pub fn error_pairs(status: i64, data: &ErrorData) -> Vec<(&'static str, String)> {
    vec![
        ("Status", status.to_string()),
        ("Error", data.error.clone()),
        ("Request", format!("{} {}", data.method, data.request)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("")), "-");
        assert_eq!(or_dash(Some("x")), "x");
    }

    #[test]
    fn test_progress_hidden_for_json_and_quiet() {
        assert!(OutputContext::new(OutputFormat::Table, true, false).shows_progress());
        assert!(!OutputContext::new(OutputFormat::Json, true, false).shows_progress());
        assert!(!OutputContext::new(OutputFormat::Table, true, true).shows_progress());
    }

    #[test]
    fn test_kv_table_contains_values() {
        let table = kv_table(&[("ID", "abc".to_string()), ("Link", "https://i".to_string())]);
        assert!(table.contains("abc"));
        assert!(table.contains("https://i"));
    }

    #[test]
    fn test_error_pairs() {
        let data = ErrorData {
            error: "bad image".to_string(),
            request: "/3/image".to_string(),
            method: "POST".to_string(),
        };
        let pairs = error_pairs(400, &data);
        assert_eq!(pairs[1], ("Error", "bad image".to_string()));
        assert_eq!(pairs[2].1, "POST /3/image");
    }
}
