//! Shared markup components used by the views.
//!
//! These are maud functions that return `Markup` fragments for composition
//! into the application markup rendered inside `#app`.

use maud::{Markup, html};

/// Inline CSS for error pages (no client bundle is loaded there).
pub const ERROR_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
body{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;display:flex;justify-content:center;align-items:center;min-height:100vh;background:#fafafa;color:#212121;padding:1rem}
.error-page{text-align:center;max-width:400px}
.error-page h1{font-size:1.5rem;margin-bottom:.75rem}
.error-page p{color:#666;margin-bottom:1rem;line-height:1.5}
.error-page a{color:#00bcd4}
"#;

/// Application frame: title bar plus the view content.
pub fn app_shell(content: Markup) -> Markup {
    html! {
        div class="app" {
            header class="app-bar" {
                a class="app-title" href="/" { "ISUketch" }
            }
            main class="app-content" {
                (content)
            }
        }
    }
}

/// Format an RFC 3339 timestamp as "YYYY/MM/DD HH:MM" (UTC).
///
/// Returns `None` for empty or unparseable input.
pub fn format_created_at(created_at: &str) -> Option<String> {
    let ts = chrono::DateTime::parse_from_rfc3339(created_at).ok()?;
    Some(
        ts.with_timezone(&chrono::Utc)
            .format("%Y/%m/%d %H:%M")
            .to_string(),
    )
}

/// Format a count with a singular/plural noun, e.g. "1 stroke", "3 strokes".
pub fn count_label(n: u64, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_created_at_parses_backend_timestamps() {
        assert_eq!(
            format_created_at("2016-10-22T03:04:05.123456Z").as_deref(),
            Some("2016/10/22 03:04")
        );
        assert_eq!(format_created_at(""), None);
        assert_eq!(format_created_at("yesterday"), None);
    }

    #[test]
    fn count_label_pluralizes() {
        assert_eq!(count_label(0, "stroke"), "0 strokes");
        assert_eq!(count_label(1, "stroke"), "1 stroke");
        assert_eq!(count_label(12, "watcher"), "12 watchers");
    }

    #[test]
    fn app_shell_links_home() {
        let html = app_shell(html! { p { "hi" } }).into_string();
        assert!(html.contains(r#"<a class="app-title" href="/">ISUketch</a>"#));
        assert!(html.contains("<p>hi</p>"));
    }
}
