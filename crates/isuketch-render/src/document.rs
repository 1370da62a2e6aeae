//! Full HTML document assembly.
//!
//! Wraps rendered application markup and its hydration script into the
//! page the client bundle boots from. The CSRF token is written into a
//! `data-csrf-token` attribute on `<html>` and is always attribute-escaped.

use maud::{DOCTYPE, Markup, PreEscaped, html};

/// Stylesheets every page links, in order.
pub const STYLESHEETS: &[&str] = &["/css/rc-color-picker.css", "/css/sanitize.css"];

/// Client bundle script.
pub const BUNDLE_SRC: &str = "/bundle.js";

/// Assemble a complete document.
///
/// `markup` and `hydration` are trusted, already-rendered fragments and are
/// embedded verbatim; `csrf_token` is untrusted and escaped.
pub fn assemble(markup: &str, hydration: &str, csrf_token: &str) -> Markup {
    html! {
        (DOCTYPE)
        html data-csrf-token=(csrf_token) {
            head {
                meta charset="utf-8";
                title { "ISUketch" }
                meta name="viewport" content="width=device-width,initial-scale=1";
                @for href in STYLESHEETS {
                    link rel="stylesheet" href=(href);
                }
                script src=(BUNDLE_SRC) async {}
            }
            body {
                div id="app" { (PreEscaped(markup)) }
                (PreEscaped(hydration))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_markup_and_hydration() {
        let doc = assemble("<p>app</p>", "<script>x=1</script>", "tok").into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains(r#"<html data-csrf-token="tok">"#));
        assert!(doc.contains(r#"<div id="app"><p>app</p></div><script>x=1</script>"#));
        assert!(doc.contains(r#"<link rel="stylesheet" href="/css/rc-color-picker.css">"#));
        assert!(doc.contains(r#"<link rel="stylesheet" href="/css/sanitize.css">"#));
        assert!(doc.contains(r#"<script src="/bundle.js" async></script>"#));
        assert!(doc.ends_with("</body></html>"));
    }

    #[test]
    fn csrf_token_is_escaped() {
        let token = r#""><script>alert(1)</script>&"#;
        let doc = assemble("", "", token).into_string();

        assert!(!doc.contains("<script>alert"));
        assert!(doc.contains(
            r#"data-csrf-token="&quot;&gt;&lt;script&gt;alert(1)&lt;/script&gt;&amp;""#
        ));
        // The only '<html' start tag is the one we emitted, and it is closed.
        assert_eq!(doc.matches("<html").count(), 1);
        assert!(doc.contains("</html>"));
    }

    #[test]
    fn assembly_is_pure() {
        assert_eq!(
            assemble("<b>a</b>", "", "t").into_string(),
            assemble("<b>a</b>", "", "t").into_string()
        );
    }
}
