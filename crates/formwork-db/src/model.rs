//! The model capability contract consumed by forms.
//!
//! A form never knows the concrete persistence engine behind its model. It
//! relies only on [`ModelAdapter`]: validate, report errors, save (quietly or
//! raising), expose identity, and hand out associated models by relation name.
//!
//! Models are shared between a parent model's association collections and
//! the forms that edit them, so they live behind a [`ModelRef`]
//! (`Rc<RefCell<M>>`). Associations are handed out type-erased as
//! [`AnyModel`] and recovered with [`downcast_model`].

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use formwork_core::{ErrorSet, FormworkError, FormworkResult};

use crate::executor::DbExecutor;

/// A shared, mutable handle to a model.
pub type ModelRef<M> = Rc<RefCell<M>>;

/// A type-erased model handle. Always wraps a `RefCell<M>`.
pub type AnyModel = Rc<dyn Any>;

/// Wraps a model in a fresh [`ModelRef`].
pub fn model_ref<M>(model: M) -> ModelRef<M> {
    Rc::new(RefCell::new(model))
}

/// Recovers a typed handle from an [`AnyModel`].
///
/// Returns `None` when the handle wraps a different model type.
pub fn downcast_model<M: 'static>(model: AnyModel) -> Option<ModelRef<M>> {
    model.downcast::<RefCell<M>>().ok()
}

/// The models reachable from a parent model through one relation.
pub enum Association {
    /// A to-one relation (`belongs_to` / `has_one`), possibly unset.
    One(Option<AnyModel>),
    /// A to-many relation, in collection order.
    Many(Vec<AnyModel>),
}

impl Association {
    /// Builds a to-one association from an optional typed handle.
    pub fn one<M: 'static>(model: Option<&ModelRef<M>>) -> Self {
        Self::One(model.map(|m| Rc::clone(m) as AnyModel))
    }

    /// Builds a to-many association from typed handles.
    pub fn many<M: 'static>(models: &[ModelRef<M>]) -> Self {
        Self::Many(models.iter().map(|m| Rc::clone(m) as AnyModel).collect())
    }

    /// Returns `true` for to-many relations.
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    /// Picks the model at `index`.
    ///
    /// Collections yield `None` past their end; to-one relations yield their
    /// target for index 0 and fail for any other index.
    ///
    /// # Errors
    ///
    /// Returns [`FormworkError::InvalidAssociationAccess`] when a to-one
    /// relation is indexed past 0.
    pub fn resolve(&self, name: &str, index: usize) -> FormworkResult<Option<AnyModel>> {
        match self {
            Self::Many(models) => Ok(models.get(index).cloned()),
            Self::One(_) if index > 0 => Err(FormworkError::InvalidAssociationAccess {
                association: name.to_string(),
                index,
            }),
            Self::One(model) => Ok(model.clone()),
        }
    }
}

/// The narrow contract every model behind a form implements.
///
/// Implementors provide validation, the raw write, identity, and
/// associations; `is_valid`, `save`, `save_or_fail`, and `is_persisted` have
/// default implementations built on those.
pub trait ModelAdapter: 'static {
    /// Human-readable model name, used in error messages (e.g. "Person").
    fn model_name(&self) -> &'static str;

    /// Rebuilds [`errors`](Self::errors) from the model's validation rules.
    fn validate(&mut self);

    /// The errors produced by the last [`validate`](Self::validate) call.
    fn errors(&self) -> &ErrorSet;

    /// Validates and returns `true` if no rule failed.
    fn is_valid(&mut self) -> bool {
        self.validate();
        self.errors().is_empty()
    }

    /// Writes the model's current state without validating it.
    fn persist(&mut self, db: &dyn DbExecutor) -> FormworkResult<()>;

    /// Validates and writes the model.
    ///
    /// # Errors
    ///
    /// Returns [`FormworkError::ValidationFailed`] when validation fails and
    /// propagates any persistence error from [`persist`](Self::persist).
    fn save_or_fail(&mut self, db: &dyn DbExecutor) -> FormworkResult<()> {
        if !self.is_valid() {
            return Err(FormworkError::ValidationFailed(self.errors().clone()));
        }
        self.persist(db)
    }

    /// Validates and writes the model, reporting any failure as `false`.
    fn save(&mut self, db: &dyn DbExecutor) -> bool {
        match self.save_or_fail(db) {
            Ok(()) => true,
            Err(FormworkError::ValidationFailed(_)) => false,
            Err(e) => {
                tracing::warn!(model = self.model_name(), error = %e, "save failed in the persistence layer");
                false
            }
        }
    }

    /// The primary key, or `None` if never written.
    fn id(&self) -> Option<i64>;

    /// Overwrites the primary key (used to undo ids assigned by a rolled-back write).
    fn set_id(&mut self, id: Option<i64>);

    /// Returns `true` once the model has been written.
    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }

    /// Returns the models reachable through relation `name`, or `None` if the
    /// model has no such relation.
    fn association(&self, _name: &str) -> Option<Association> {
        None
    }
}

/// Arranges for `model`'s id to go back to `previous` if the transaction
/// behind `db` rolls back. Nothing is registered when the id is unchanged.
pub fn undo_id_on_rollback<M: ModelAdapter>(
    model: &ModelRef<M>,
    previous: Option<i64>,
    db: &dyn DbExecutor,
) {
    let assigned = model.borrow().id();
    if assigned == previous {
        return;
    }
    let weak: Weak<RefCell<M>> = Rc::downgrade(model);
    db.on_rollback(Box::new(move || {
        let Some(model) = weak.upgrade() else {
            return;
        };
        match model.try_borrow_mut() {
            Ok(mut model) => {
                tracing::debug!(model = model.model_name(), ?assigned, "id reset after rollback");
                model.set_id(previous);
            }
            Err(_) => tracing::warn!(?assigned, "model busy during rollback, id not reset"),
        };
    }));
}

/// Validates and writes a shared model, like [`ModelAdapter::save_or_fail`],
/// and clears an id assigned by the write if the enclosing transaction later
/// rolls back.
///
/// Models that write related models from their own
/// [`persist`](ModelAdapter::persist) use this for those writes.
///
/// # Errors
///
/// As [`ModelAdapter::save_or_fail`].
pub fn save_shared<M: ModelAdapter>(model: &ModelRef<M>, db: &dyn DbExecutor) -> FormworkResult<()> {
    let previous = model.borrow().id();
    let result = model.borrow_mut().save_or_fail(db);
    undo_id_on_rollback(model, previous, db);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Widget {
        id: Option<i64>,
        name: String,
        errors: ErrorSet,
        writes: usize,
    }

    impl ModelAdapter for Widget {
        fn model_name(&self) -> &'static str {
            "Widget"
        }
        fn validate(&mut self) {
            self.errors = ErrorSet::new();
            if self.name.is_empty() {
                self.errors.add("name", "blank", "can't be blank");
            }
        }
        fn errors(&self) -> &ErrorSet {
            &self.errors
        }
        fn persist(&mut self, _db: &dyn DbExecutor) -> FormworkResult<()> {
            if self.name == "explode" {
                return Err(FormworkError::IntegrityError("UNIQUE constraint failed".into()));
            }
            self.writes += 1;
            self.id = Some(1);
            Ok(())
        }
        fn id(&self) -> Option<i64> {
            self.id
        }
        fn set_id(&mut self, id: Option<i64>) {
            self.id = id;
        }
    }

    struct NoDb;

    impl DbExecutor for NoDb {
        fn execute_sql(&self, _sql: &str, _params: &[crate::Value]) -> FormworkResult<u64> {
            Ok(0)
        }
        fn query(&self, _sql: &str, _params: &[crate::Value]) -> FormworkResult<Vec<crate::Row>> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_save_invalid_returns_false_without_writing() {
        let mut w = Widget::default();
        assert!(!w.save(&NoDb));
        assert_eq!(w.writes, 0);
        assert!(!w.is_persisted());
        assert!(w.errors().contains_key("name"));
    }

    #[test]
    fn test_save_or_fail_invalid_raises_validation_failed() {
        let mut w = Widget::default();
        let err = w.save_or_fail(&NoDb).unwrap_err();
        assert!(err.validation_errors().is_some());
    }

    #[test]
    fn test_save_converts_persistence_error_to_false() {
        let mut w = Widget {
            name: "explode".into(),
            ..Widget::default()
        };
        assert!(!w.save(&NoDb));
        let err = w.save_or_fail(&NoDb).unwrap_err();
        assert!(err.is_persistence_failure());
    }

    #[test]
    fn test_save_valid_persists() {
        let mut w = Widget {
            name: "gear".into(),
            ..Widget::default()
        };
        assert!(w.save(&NoDb));
        assert!(w.is_persisted());
    }

    #[test]
    fn test_save_shared_id_follows_the_transaction() {
        let committed = model_ref(Widget {
            name: "gear".into(),
            ..Widget::default()
        });
        crate::atomic(&NoDb, |txn| save_shared(&committed, txn)).unwrap();
        assert_eq!(committed.borrow().id(), Some(1));

        let rolled_back = model_ref(Widget {
            name: "gear".into(),
            ..Widget::default()
        });
        crate::atomic(&NoDb, |txn| {
            save_shared(&rolled_back, txn)?;
            assert!(rolled_back.borrow().is_persisted());
            txn.set_rollback();
            Ok(())
        })
        .unwrap();
        assert_eq!(rolled_back.borrow().id(), None);
        assert_eq!(rolled_back.borrow().writes, 1);
    }

    #[test]
    fn test_unchanged_id_is_left_alone() {
        let widget = model_ref(Widget {
            id: Some(7),
            name: "gear".into(),
            ..Widget::default()
        });
        crate::atomic(&NoDb, |txn| {
            widget.borrow_mut().set_id(Some(7));
            undo_id_on_rollback(&widget, Some(7), txn);
            assert_eq!(txn.pending_rollback_callbacks(), 0);
            txn.set_rollback();
            Ok(())
        })
        .unwrap();
        assert_eq!(widget.borrow().id(), Some(7));
    }

    #[test]
    fn test_association_resolve_collection() {
        let a = model_ref(Widget::default());
        let b = model_ref(Widget::default());
        let assoc = Association::many(&[Rc::clone(&a), Rc::clone(&b)]);
        assert!(assoc.is_collection());

        let second = assoc.resolve("widgets", 1).unwrap().unwrap();
        let second = downcast_model::<Widget>(second).unwrap();
        assert!(Rc::ptr_eq(&second, &b));
        assert!(assoc.resolve("widgets", 5).unwrap().is_none());
    }

    #[test]
    fn test_association_resolve_to_one() {
        let a = model_ref(Widget::default());
        let assoc = Association::one(Some(&a));
        assert!(assoc.resolve("widget", 0).unwrap().is_some());
        let err = assoc.resolve("widget", 2).unwrap_err();
        assert!(matches!(
            err,
            FormworkError::InvalidAssociationAccess { index: 2, .. }
        ));
        assert!(Association::one::<Widget>(None).resolve("widget", 0).unwrap().is_none());
    }

    #[test]
    fn test_downcast_wrong_type() {
        let a: AnyModel = model_ref(Widget::default());
        assert!(downcast_model::<String>(a).is_none());
    }
}
