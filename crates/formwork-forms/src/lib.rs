//! # formwork-forms
//!
//! Form objects over persisted models. A form wraps exactly one model,
//! exposes some of its attributes (verbatim or through custom parsing),
//! lazily materializes associated sub-forms that mirror the model's
//! relations, aggregates validation across the whole tree, and saves the
//! tree as one atomic unit.
//!
//! ## Module Overview
//!
//! - [`form`] - The [`Form`] trait, [`FormBase`] state, and the object-safe [`FormNode`]
//! - [`cache`] - [`AssociatedFormCache`], the identity-stable sub-form cache
//! - [`registry`] - [`FormRegistry`] for resolving form classes by name
//! - [`config`] - Process-wide form reporting options
//! - [`macros`] - `delegate_attributes!` and `delegate_association!`
//!
//! ## Example
//!
//! ```ignore
//! use formwork_forms::{delegate_association, delegate_attributes, Form, FormBase};
//!
//! pub struct PersonForm {
//!     base: FormBase<Person>,
//! }
//!
//! impl Form for PersonForm {
//!     type Model = Person;
//!     fn from_model(model: ModelRef<Person>) -> Self {
//!         Self { base: FormBase::new(model) }
//!     }
//!     fn base(&self) -> &FormBase<Person> { &self.base }
//!     fn base_mut(&mut self) -> &mut FormBase<Person> { &mut self.base }
//! }
//!
//! delegate_attributes! {
//!     PersonForm {
//!         first_name / set_first_name: String,
//!         reader last_name: String,
//!     }
//! }
//!
//! delegate_association! {
//!     PersonForm {
//!         country => CountryForm,
//!     }
//! }
//! ```

pub mod cache;
pub mod config;
pub mod form;
pub mod macros;
pub mod registry;

pub use cache::AssociatedFormCache;
pub use form::{Form, FormBase, FormNode};
pub use registry::{FormFactory, FormRegistry};

// Used by the declaration macros.
pub use formwork_core::{FormworkError, FormworkResult};
