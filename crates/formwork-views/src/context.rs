//! The rendering context handed to presenters.

use serde::{Deserialize, Serialize};

/// What a presenter knows about the page it renders into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewContext {
    /// The path of the current request, e.g. `/admin/people`.
    pub request_path: String,
}

impl ViewContext {
    /// Creates a context for a request to `request_path`.
    pub fn new(request_path: impl Into<String>) -> Self {
        Self {
            request_path: request_path.into(),
        }
    }

    /// Returns `true` if the current request is for `path`.
    pub fn is_current(&self, path: &str) -> bool {
        self.request_path == path
    }

    /// Builds an escaped `<a>` tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use formwork_views::ViewContext;
    ///
    /// let view = ViewContext::new("/");
    /// assert_eq!(
    ///     view.link_to("Q&A", "/faq?a=1&b=2"),
    ///     r#"<a href="/faq?a=1&amp;b=2">Q&amp;A</a>"#
    /// );
    /// ```
    pub fn link_to(&self, text: &str, path: &str) -> String {
        format!(
            r#"<a href="{}">{}</a>"#,
            escape_html(path),
            escape_html(text)
        )
    }
}

/// Escapes HTML special characters in a string.
///
/// Replaces `&`, `<`, `>`, `"`, and `'` with their HTML entity equivalents.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x's")</script>"#),
            "&lt;script&gt;alert(&quot;x&#x27;s&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_is_current() {
        let view = ViewContext::new("/admin/people");
        assert!(view.is_current("/admin/people"));
        assert!(!view.is_current("/admin"));
    }

    #[test]
    fn test_link_to_escapes_text() {
        let view = ViewContext::default();
        assert_eq!(
            view.link_to("<b>People</b>", "/people"),
            r#"<a href="/people">&lt;b&gt;People&lt;/b&gt;</a>"#
        );
    }
}
