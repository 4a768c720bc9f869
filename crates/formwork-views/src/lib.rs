//! # formwork-views
//!
//! Presentation helpers. A [`Presenter`] wraps any [`Presentable`] value,
//! dereferences to it, and renders it into a [`ViewContext`] that can be
//! bound up front or supplied per call.
//!
//! ## Modules
//!
//! - [`context`] - [`ViewContext`] and HTML escaping
//! - [`presenter`] - [`Presenter`] and the [`Presentable`] trait
//! - [`navigation`] - The navigation [`Link`]

pub mod context;
pub mod navigation;
pub mod presenter;

pub use context::{escape_html, ViewContext};
pub use navigation::Link;
pub use presenter::{Presentable, Presenter, RenderOptions};
