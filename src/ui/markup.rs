//! Style markup used by the core screen builders, translated to ratatui spans.
//!
//! Lines carry `[name]text[/]` or `[name]text[/name]` tags. Bracketed text
//! that is not a known tag (for example `[ pro | utc ]`) stays literal.

use once_cell::sync::Lazy;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
};
use regex::Regex;

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(/)?([a-z][a-z0-9_.]*)?\]").unwrap());

/// Style for a markup tag name, `None` if the name is not a known tag
pub fn style_for(name: &str) -> Option<Style> {
    let style = match name {
        "header" => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        "value" => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        "dim" => Style::default().fg(Color::DarkGray),
        "bold" => Style::default().add_modifier(Modifier::BOLD),
        "info" => Style::default().fg(Color::Blue),
        "warning" => Style::default().fg(Color::Yellow),
        "error" => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        "success" => Style::default().fg(Color::Green),
        "separator" | "table.border" => Style::default().fg(Color::DarkGray),
        "cost.low" => Style::default().fg(Color::Green),
        "cost.medium" => Style::default().fg(Color::Yellow),
        "cost.high" => Style::default().fg(Color::Red),
        "progress.bar" => Style::default().fg(Color::Cyan),
        _ => return None,
    };
    Some(style)
}

/// Keep only text modifiers when color output is disabled
fn strip_color(style: Style) -> Style {
    Style::default().add_modifier(style.add_modifier)
}

/// Translate one marked-up line
pub fn to_line(text: &str, color: bool) -> Line<'static> {
    let mut spans = Vec::new();
    let mut stack: Vec<Style> = Vec::new();
    let mut literal = String::new();
    let mut last = 0;

    let current = |stack: &[Style]| {
        stack
            .iter()
            .fold(Style::default(), |acc, style| acc.patch(*style))
    };

    for caps in TAG_PATTERN.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let closing = caps.get(1).is_some();
        let name = caps.get(2).map(|m| m.as_str());

        let recognized = match (closing, name) {
            (true, None) => true,
            (_, Some(name)) => style_for(name).is_some(),
            (false, None) => false,
        };
        if !recognized {
            continue;
        }

        literal.push_str(&text[last..whole.start()]);
        if !literal.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut literal), current(&stack)));
        }
        last = whole.end();

        if closing {
            stack.pop();
        } else if let Some(style) = name.and_then(style_for) {
            stack.push(if color { style } else { strip_color(style) });
        }
    }

    literal.push_str(&text[last..]);
    if !literal.is_empty() {
        spans.push(Span::styled(literal, current(&stack)));
    }

    Line::from(spans)
}

/// Translate a whole screen
pub fn to_text(lines: &[String], color: bool) -> Text<'static> {
    Text::from(
        lines
            .iter()
            .map(|line| to_line(line, color))
            .collect::<Vec<_>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn contents(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_plain_line() {
        let line = to_line("no tags here", true);
        assert_eq!(contents(&line), vec!["no tags here"]);
        assert_eq!(line.spans[0].style, Style::default());
    }

    #[test]
    fn test_tagged_segments() {
        let line = to_line("Cost: [value]$1.00[/] left", true);
        assert_eq!(contents(&line), vec!["Cost: ", "$1.00", " left"]);
        assert_eq!(line.spans[1].style, style_for("value").unwrap());
        assert_eq!(line.spans[2].style, Style::default());
    }

    #[test]
    fn test_named_close() {
        let line = to_line("[warning]careful[/warning]!", true);
        assert_eq!(contents(&line), vec!["careful", "!"]);
        assert_eq!(line.spans[0].style.fg, Some(Color::Yellow));
    }

    #[test]
    fn test_unknown_brackets_stay_literal() {
        let line = to_line("[dim][ pro | utc ][/]", true);
        assert_eq!(contents(&line), vec!["[ pro | utc ]"]);

        let line = to_line("[nothing] and []", true);
        assert_eq!(contents(&line), vec!["[nothing] and []"]);
    }

    #[test]
    fn test_bar_brackets() {
        let line = to_line("🟢 [[cost.low]██[/][table.border]░░[/]]", true);
        assert_eq!(contents(&line), vec!["🟢 [", "██", "░░", "]"]);
        assert_eq!(line.spans[1].style.fg, Some(Color::Green));
    }

    #[test]
    fn test_nested_tags_combine() {
        let line = to_line("[bold][error]x[/][/]", true);
        let style = line.spans[0].style;
        assert_eq!(style.fg, Some(Color::Red));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_stray_close_ignored() {
        let line = to_line("a[/]b", true);
        assert_eq!(contents(&line), vec!["a", "b"]);
    }

    #[test]
    fn test_color_disabled_keeps_modifiers() {
        let line = to_line("[header]TITLE[/] [success]ok[/]", false);
        assert_eq!(line.spans[0].style.fg, None);
        assert!(line.spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(line.spans[2].style, Style::default());
    }

    #[test]
    fn test_to_text_line_count() {
        let text = to_text(&["a".to_string(), String::new(), "[dim]b[/]".to_string()], true);
        assert_eq!(text.lines.len(), 3);
    }
}
