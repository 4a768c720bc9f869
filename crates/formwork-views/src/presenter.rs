//! Presenters.
//!
//! A [`Presenter`] is a thin wrapper: every field and method of the wrapped
//! value stays reachable through `Deref`, and [`Presenter::render`] adds a
//! scoped rendering step on top. The view context passed to `render` is
//! only in effect for that call; the previously bound context comes back
//! afterward, even if generation panics.

use std::fmt;
use std::ops::{Deref, DerefMut};

use formwork_core::{FormworkError, FormworkResult};

use crate::context::{escape_html, ViewContext};

/// Extra options forwarded to [`Presentable::generate`].
pub type RenderOptions = serde_json::Map<String, serde_json::Value>;

/// A value that knows how to render itself.
pub trait Presentable: fmt::Debug {
    /// Builds the HTML for this value.
    ///
    /// The default renders the value's debug representation in a `<div>`.
    fn generate(&self, _view: &ViewContext, _options: &RenderOptions) -> String {
        format!("<div>{}</div>", escape_html(&format!("{self:?}")))
    }
}

/// Wraps a presentable value together with an optional bound view context.
///
/// # Examples
///
/// ```
/// use formwork_views::{Link, Presenter, RenderOptions, ViewContext};
///
/// let mut presenter = Presenter::new(Link::new("People", "/people"));
/// assert_eq!(presenter.text, "People");
///
/// let html = presenter
///     .render(Some(ViewContext::new("/people")), &RenderOptions::new())
///     .unwrap();
/// assert_eq!(html, r#"<li class="active"><a href="/people">People</a></li>"#);
/// assert!(presenter.view().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Presenter<T> {
    object: T,
    view: Option<ViewContext>,
}

impl<T: Presentable> Presenter<T> {
    /// Wraps `object` with no view context bound.
    pub const fn new(object: T) -> Self {
        Self { object, view: None }
    }

    /// Wraps `object` with `view` bound.
    pub const fn with_view(object: T, view: ViewContext) -> Self {
        Self {
            object,
            view: Some(view),
        }
    }

    /// The bound view context, if any.
    pub const fn view(&self) -> Option<&ViewContext> {
        self.view.as_ref()
    }

    /// Binds `view` for subsequent renders.
    pub fn set_view(&mut self, view: ViewContext) {
        self.view = Some(view);
    }

    /// Unwraps the presented value.
    pub fn into_inner(self) -> T {
        self.object
    }

    /// Renders the wrapped value.
    ///
    /// `view`, when given, replaces the bound context for this call only.
    ///
    /// # Errors
    ///
    /// Returns [`FormworkError::NoViewContext`] when neither a bound context
    /// nor `view` is available.
    pub fn render(
        &mut self,
        view: Option<ViewContext>,
        options: &RenderOptions,
    ) -> FormworkResult<String> {
        let Self { object, view: slot } = self;
        let guard = ViewGuard::substitute(slot, view);
        let Some(current) = guard.slot.as_ref() else {
            tracing::warn!(object = ?object, "render without a view context");
            return Err(FormworkError::NoViewContext);
        };
        tracing::trace!(request_path = %current.request_path, "rendering");
        Ok(object.generate(current, options))
    }
}

/// Puts the previous view context back when dropped.
struct ViewGuard<'a> {
    slot: &'a mut Option<ViewContext>,
    previous: Option<Option<ViewContext>>,
}

impl<'a> ViewGuard<'a> {
    fn substitute(slot: &'a mut Option<ViewContext>, view: Option<ViewContext>) -> Self {
        let previous = view.map(|v| slot.replace(v));
        Self { slot, previous }
    }
}

impl Drop for ViewGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            *self.slot = previous;
        }
    }
}

impl<T> Deref for Presenter<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.object
    }
}

impl<T> DerefMut for Presenter<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[derive(Debug)]
    struct Badge {
        label: String,
    }

    impl Badge {
        fn shout(&self) -> String {
            self.label.to_uppercase()
        }
    }

    impl Presentable for Badge {}

    #[derive(Debug)]
    struct Echo;

    impl Presentable for Echo {
        fn generate(&self, view: &ViewContext, options: &RenderOptions) -> String {
            let suffix = options
                .get("suffix")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default();
            format!("{}{suffix}", view.request_path)
        }
    }

    #[derive(Debug)]
    struct Exploding;

    impl Presentable for Exploding {
        fn generate(&self, _view: &ViewContext, _options: &RenderOptions) -> String {
            panic!("generation failed");
        }
    }

    #[test]
    fn test_delegates_to_wrapped_object() {
        let mut presenter = Presenter::new(Badge {
            label: "new".into(),
        });
        assert_eq!(presenter.shout(), "NEW");
        presenter.label.push('!');
        assert_eq!(presenter.into_inner().label, "new!");
    }

    #[test]
    fn test_default_generate_escapes_debug_output() {
        let mut presenter = Presenter::with_view(
            Badge {
                label: "<b>".into(),
            },
            ViewContext::new("/"),
        );
        let html = presenter.render(None, &RenderOptions::new()).unwrap();
        assert_eq!(html, "<div>Badge { label: &quot;&lt;b&gt;&quot; }</div>");
    }

    #[test]
    fn test_render_without_context_fails() {
        let mut presenter = Presenter::new(Echo);
        let err = presenter.render(None, &RenderOptions::new()).unwrap_err();
        assert!(matches!(err, FormworkError::NoViewContext));
    }

    #[test]
    fn test_call_context_is_scoped_to_the_call() {
        let mut presenter = Presenter::with_view(Echo, ViewContext::new("/bound"));
        let html = presenter
            .render(Some(ViewContext::new("/call")), &RenderOptions::new())
            .unwrap();
        assert_eq!(html, "/call");
        assert_eq!(presenter.view().unwrap().request_path, "/bound");
        assert_eq!(presenter.render(None, &RenderOptions::new()).unwrap(), "/bound");
    }

    #[test]
    fn test_options_reach_generate() {
        let mut presenter = Presenter::new(Echo);
        let mut options = RenderOptions::new();
        options.insert("suffix".into(), serde_json::json!("#top"));
        let html = presenter
            .render(Some(ViewContext::new("/people")), &options)
            .unwrap();
        assert_eq!(html, "/people#top");
        assert!(presenter.view().is_none());
    }

    #[test]
    fn test_context_restored_after_panic() {
        let mut presenter = Presenter::with_view(Exploding, ViewContext::new("/bound"));
        let result = catch_unwind(AssertUnwindSafe(|| {
            presenter.render(Some(ViewContext::new("/call")), &RenderOptions::new())
        }));
        assert!(result.is_err());
        assert_eq!(presenter.view().unwrap().request_path, "/bound");
    }
}
