//! Navigation links.

use serde::{Deserialize, Serialize};

use crate::context::{escape_html, ViewContext};
use crate::presenter::{Presentable, RenderOptions};

/// One entry of a navigation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub path: String,
    #[serde(default)]
    pub css_classes: Vec<String>,
}

impl Link {
    pub fn new(text: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            path: path.into(),
            css_classes: Vec::new(),
        }
    }

    /// Adds CSS classes rendered on the `<li>` element.
    #[must_use]
    pub fn with_css_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.css_classes.extend(classes.into_iter().map(Into::into));
        self
    }

    /// The classes for the current request, with `active` appended when the
    /// link points at the requested path.
    fn classes_for(&self, view: &ViewContext) -> Vec<&str> {
        let mut classes: Vec<&str> = self.css_classes.iter().map(String::as_str).collect();
        if view.is_current(&self.path) {
            classes.push("active");
        }
        classes
    }
}

impl Presentable for Link {
    fn generate(&self, view: &ViewContext, _options: &RenderOptions) -> String {
        format!(
            r#"<li class="{}">{}</li>"#,
            escape_html(&self.classes_for(view).join(" ")),
            view.link_to(&self.text, &self.path)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Presenter;

    fn render(link: Link, request_path: &str) -> String {
        Presenter::new(link)
            .render(Some(ViewContext::new(request_path)), &RenderOptions::new())
            .unwrap()
    }

    #[test]
    fn test_inactive_link() {
        assert_eq!(
            render(Link::new("People", "/people"), "/pets"),
            r#"<li class=""><a href="/people">People</a></li>"#
        );
    }

    #[test]
    fn test_active_link_keeps_custom_classes() {
        let link = Link::new("People", "/people").with_css_classes(["nav-item", "wide"]);
        assert_eq!(
            render(link, "/people"),
            r#"<li class="nav-item wide active"><a href="/people">People</a></li>"#
        );
    }

    #[test]
    fn test_classes_and_text_are_escaped() {
        let link = Link::new("<People>", "/people").with_css_classes([r#"x" onclick="y"#]);
        assert_eq!(
            render(link, "/"),
            r#"<li class="x&quot; onclick=&quot;y"><a href="/people">&lt;People&gt;</a></li>"#
        );
    }

    #[test]
    fn test_deserializes_without_classes() {
        let link: Link = serde_json::from_str(r#"{"text":"Home","path":"/"}"#).unwrap();
        assert_eq!(link, Link::new("Home", "/"));
    }
}
