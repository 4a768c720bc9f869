//! Form classes resolved by name.
//!
//! Typed access (`FormBase::associated_form::<F>`) names the sub-form type
//! at compile time. Some declarations only know a class name, e.g. when the
//! form graph is assembled from configuration; those go through the global
//! [`FormRegistry`]. A name nobody registered fails with
//! [`FormworkError::MissingFormClass`](formwork_core::FormworkError::MissingFormClass).

use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use formwork_db::{downcast_model, model_ref, AnyModel};

use crate::form::{Form, FormNode};

/// Builds a sub-form around an associated model, or around a fresh default
/// model when the association is empty.
///
/// Returns `None` when the model is not the form's model type.
pub type FormFactory = fn(Option<AnyModel>) -> Option<Box<dyn FormNode>>;

/// The [`FormFactory`] for form type `F`.
pub fn build_form<F: Form>(model: Option<AnyModel>) -> Option<Box<dyn FormNode>> {
    let model = match model {
        Some(model) => downcast_model::<F::Model>(model)?,
        None => model_ref(F::Model::default()),
    };
    Some(Box::new(F::from_model(model)))
}

fn global_registry() -> &'static RwLock<HashMap<String, FormFactory>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, FormFactory>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// The global name -> form class registry.
///
/// # Examples
///
/// ```ignore
/// FormRegistry::register::<CountryForm>("CountryForm");
/// assert!(FormRegistry::is_registered("CountryForm"));
/// ```
pub struct FormRegistry;

impl FormRegistry {
    /// Registers form type `F` under `class_name`, replacing any previous entry.
    pub fn register<F: Form>(class_name: &str) {
        Self::register_factory(class_name, build_form::<F>);
    }

    /// Registers a custom factory under `class_name`.
    pub fn register_factory(class_name: &str, factory: FormFactory) {
        global_registry()
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(class_name.to_string(), factory);
        tracing::debug!(class_name, "registered form class");
    }

    /// Looks up the factory registered under `class_name`.
    pub fn resolve(class_name: &str) -> Option<FormFactory> {
        global_registry()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(class_name)
            .copied()
    }

    /// Returns `true` if `class_name` is registered.
    pub fn is_registered(class_name: &str) -> bool {
        Self::resolve(class_name).is_some()
    }
}
