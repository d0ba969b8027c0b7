//! Screen header.

const SPARKLES: &str = "✦ ✧ ✦ ✧";
const TITLE: &str = "USAGE MONITOR";
const SEPARATOR_WIDTH: usize = 60;

pub struct HeaderManager;

impl HeaderManager {
    /// Title, `=` rule, `[ plan | timezone ]`, blank line
    pub fn create_header(plan: &str, timezone: &str) -> Vec<String> {
        vec![
            format!("[header]{SPARKLES}[/] [header]{TITLE}[/] [header]{SPARKLES}[/]"),
            format!("[table.border]{}[/]", "=".repeat(SEPARATOR_WIDTH)),
            format!("[ {} | {} ]", plan.to_lowercase(), timezone.to_lowercase()),
            String::new(),
        ]
    }
}
