//! The form protocol.
//!
//! A [`Form`] pairs one backing model (behind a shared [`ModelRef`]) with a
//! [`FormBase`] holding everything the protocol needs: the associated-form
//! cache, the error set rebuilt on every validation pass, and input errors
//! recorded by custom writers.
//!
//! ## Validation
//!
//! [`Form::validate`] rebuilds the error set from scratch:
//!
//! 1. the model's own validation errors, verbatim and field-keyed
//! 2. pending input errors and [`Form::validate_form`] rules
//! 3. one base-keyed error per materialized associated form that is invalid
//!
//! Associated forms that were never accessed are not validated.
//!
//! ## Saving
//!
//! [`Form::save`] and [`Form::save_or_fail`] open one transaction scope and
//! write the root model first, then every materialized associated form (each
//! of which writes its own model, then its own sub-forms) in
//! materialization order. Any failure rolls back every write of the tree.
//! Each write that assigns an id registers its reset with the transaction,
//! so after a rollback `is_persisted` matches storage for every model the
//! save touched, including models written by another model's `persist`.

use std::any::Any;

use formwork_core::logging::form_span;
use formwork_core::{ErrorSet, FormworkError, FormworkResult};
use formwork_db::{
    atomic, model_ref, undo_id_on_rollback, AnyModel, DbExecutor, ModelAdapter, ModelRef,
    Transaction,
};

use crate::cache::AssociatedFormCache;
use crate::config;
use crate::registry::{build_form, FormFactory, FormRegistry};

/// The per-form state every [`Form`] embeds.
pub struct FormBase<M: ModelAdapter> {
    model: ModelRef<M>,
    associated: AssociatedFormCache,
    errors: ErrorSet,
    input_errors: ErrorSet,
}

impl<M: ModelAdapter> FormBase<M> {
    /// Creates the state for a form around `model`.
    pub fn new(model: ModelRef<M>) -> Self {
        Self {
            model,
            associated: AssociatedFormCache::new(),
            errors: ErrorSet::new(),
            input_errors: ErrorSet::new(),
        }
    }

    /// The backing model.
    pub const fn model(&self) -> &ModelRef<M> {
        &self.model
    }

    /// The errors of the last validation pass.
    pub const fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    /// Input errors recorded by custom writers and not yet cleared.
    pub const fn input_errors(&self) -> &ErrorSet {
        &self.input_errors
    }

    /// The materialized associated forms.
    pub const fn associated_forms(&self) -> &AssociatedFormCache {
        &self.associated
    }

    /// Records that a custom writer could not parse its input.
    ///
    /// Replaces any earlier input error for `field`. The model stays
    /// untouched, and the error shows up on the next validation pass.
    pub fn record_input_error(
        &mut self,
        field: &str,
        code: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.input_errors.remove(field);
        self.input_errors.add(field, code, message);
    }

    /// Forgets the input error for `field`, typically after a successful write.
    pub fn clear_input_error(&mut self, field: &str) {
        self.input_errors.remove(field);
    }

    /// Returns the sub-form of type `F` for relation `name` at `index`,
    /// creating it on first access.
    ///
    /// A to-many relation is indexed into; a to-one relation only accepts
    /// index 0. When the relation has no model at that position, the
    /// sub-form wraps a fresh `F::Model::default()`.
    ///
    /// # Errors
    ///
    /// - [`FormworkError::UnknownAssociation`] if the model has no relation `name`
    /// - [`FormworkError::InvalidAssociationAccess`] if a to-one relation is indexed past 0
    /// - [`FormworkError::MissingFormClass`] if `F` cannot wrap the associated model,
    ///   or `(name, index)` was already materialized as another form type
    pub fn associated_form<F: Form>(&mut self, name: &str, index: usize) -> FormworkResult<&mut F> {
        let class_name = short_type_name::<F>();
        let node = self.associated_node(name, index, class_name, || Ok(build_form::<F> as FormFactory))?;
        let cached = node.node_name();
        node.as_any_mut().downcast_mut::<F>().ok_or_else(|| {
            FormworkError::MissingFormClass(format!(
                "{name}[{index}] is already materialized as {cached}, not {class_name}"
            ))
        })
    }

    /// Returns the sub-form for relation `name` at `index`, creating it on
    /// first access from the form class registered as `class_name`.
    ///
    /// # Errors
    ///
    /// As [`associated_form`](Self::associated_form), plus
    /// [`FormworkError::MissingFormClass`] when no form class is registered
    /// under `class_name`.
    pub fn associated_form_named(
        &mut self,
        name: &str,
        class_name: &str,
        index: usize,
    ) -> FormworkResult<&mut dyn FormNode> {
        self.associated_node(name, index, class_name, || {
            FormRegistry::resolve(class_name).ok_or_else(|| {
                FormworkError::MissingFormClass(format!(
                    "no form class registered as '{class_name}'"
                ))
            })
        })
    }

    fn associated_node<R>(
        &mut self,
        name: &str,
        index: usize,
        class_name: &str,
        resolve_factory: R,
    ) -> FormworkResult<&mut dyn FormNode>
    where
        R: FnOnce() -> FormworkResult<FormFactory>,
    {
        let model = &self.model;
        self.associated.get_or_create(name, index, || {
            let factory = resolve_factory()?;
            let target = associated_model(model, name, index)?;
            factory(target).ok_or_else(|| {
                FormworkError::MissingFormClass(format!(
                    "{class_name} cannot wrap the model behind association '{name}'"
                ))
            })
        })
    }
}

/// Picks the model behind `name` at `index` on the parent model.
fn associated_model<M: ModelAdapter>(
    model: &ModelRef<M>,
    name: &str,
    index: usize,
) -> FormworkResult<Option<AnyModel>> {
    let parent = model.borrow();
    let association =
        parent
            .association(name)
            .ok_or_else(|| FormworkError::UnknownAssociation {
                model: parent.model_name().to_string(),
                association: name.to_string(),
            })?;
    association.resolve(name, index)
}

impl<M: ModelAdapter + std::fmt::Debug> std::fmt::Debug for FormBase<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormBase")
            .field("model", &self.model)
            .field("associated", &self.associated)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

/// `my_app::forms::PersonForm` -> `PersonForm`.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

/// A form object wrapping one model.
///
/// Implementors embed a [`FormBase`] and provide the four required methods;
/// attribute accessors come from [`delegate_attributes!`](crate::delegate_attributes)
/// or hand-written methods, association accessors from
/// [`delegate_association!`](crate::delegate_association).
pub trait Form: Sized + 'static {
    /// The backing model type.
    type Model: ModelAdapter + Default;

    /// Wraps an existing shared model.
    fn from_model(model: ModelRef<Self::Model>) -> Self;

    /// The embedded form state.
    fn base(&self) -> &FormBase<Self::Model>;

    /// The embedded form state, mutably.
    fn base_mut(&mut self) -> &mut FormBase<Self::Model>;

    /// Wraps a model the caller owns outright.
    fn new(model: Self::Model) -> Self {
        Self::from_model(model_ref(model))
    }

    /// The form's type name, used in logs.
    fn form_name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    /// Form-level rules beyond the model's own validation.
    fn validate_form(&self, _errors: &mut ErrorSet) {}

    /// The backing model.
    fn model(&self) -> &ModelRef<Self::Model> {
        self.base().model()
    }

    /// The model's primary key.
    fn id(&self) -> Option<i64> {
        self.model().borrow().id()
    }

    /// Whether the model has been written.
    fn is_persisted(&self) -> bool {
        self.model().borrow().is_persisted()
    }

    /// The errors of the last validation pass.
    fn errors(&self) -> &ErrorSet {
        self.base().errors()
    }

    /// Rebuilds [`errors`](Self::errors) for this form and its materialized
    /// associated forms.
    fn validate(&mut self) {
        let mut errors = ErrorSet::new();
        {
            let mut model = self.model().borrow_mut();
            model.validate();
            errors.merge(model.errors());
        }
        errors.merge(&self.form_errors());

        let code = config::association_error_code();
        for child in self.base_mut().associated.iter_mut() {
            if !child.node_is_valid() {
                errors.add_base(
                    code.as_str(),
                    format!("associated {} form has some errors", child.node_model_name()),
                );
            }
        }

        tracing::debug!(form = self.form_name(), errors = errors.len(), "validated");
        self.base_mut().errors = errors;
    }

    /// Validates and returns `true` if the form and every materialized
    /// associated form are valid.
    fn is_valid(&mut self) -> bool {
        self.validate();
        self.errors().is_empty()
    }

    /// Errors that belong to the form itself rather than the model: pending
    /// input errors and [`validate_form`](Self::validate_form) rules.
    fn form_errors(&self) -> ErrorSet {
        let mut errors = self.base().input_errors().clone();
        self.validate_form(&mut errors);
        errors
    }

    /// Saves the whole form tree atomically.
    ///
    /// Returns `Ok(false)` when any node fails validation or persistence;
    /// every write of the tree is then rolled back. `Err` is reserved for
    /// failures of the transaction itself.
    ///
    /// `save` does not populate [`errors`](Self::errors); call
    /// [`is_valid`](Self::is_valid) to inspect a failure.
    fn save(&mut self, db: &dyn DbExecutor) -> FormworkResult<bool> {
        let span = form_span(self.form_name());
        let _entered = span.enter();

        let saved = atomic(db, |txn| {
            let saved = self.save_node(txn);
            if !saved {
                txn.set_rollback();
            }
            Ok(saved)
        })?;

        if saved {
            tracing::info!("form saved");
        } else {
            tracing::warn!("form save failed, transaction rolled back");
        }
        Ok(saved)
    }

    /// Saves the whole form tree atomically, failing on the first node that
    /// cannot be written.
    ///
    /// # Errors
    ///
    /// Returns [`FormworkError::ValidationFailed`] for validation failures
    /// and propagates persistence failures. Every write of the tree is
    /// rolled back in both cases.
    fn save_or_fail(&mut self, db: &dyn DbExecutor) -> FormworkResult<()> {
        let span = form_span(self.form_name());
        let _entered = span.enter();

        let outcome = atomic(db, |txn| self.save_node_or_fail(txn));
        if let Err(e) = &outcome {
            tracing::warn!(error = %e, "form save failed, transaction rolled back");
        }
        outcome
    }
}

/// The object-safe view of a form, used for associated forms whose concrete
/// type is erased inside a parent's cache.
///
/// Every [`Form`] is a `FormNode`.
pub trait FormNode: Any {
    /// The form's type name.
    fn node_name(&self) -> &'static str;

    /// The backing model's name.
    fn node_model_name(&self) -> &'static str;

    /// Validates the form tree rooted here.
    fn node_is_valid(&mut self) -> bool;

    /// The errors of the last validation pass.
    fn node_errors(&self) -> &ErrorSet;

    /// Writes this node's model, then its materialized sub-forms, inside `txn`.
    /// Stops at the first failure.
    fn save_node(&mut self, txn: &Transaction<'_>) -> bool;

    /// Raising variant of [`save_node`](Self::save_node).
    fn save_node_or_fail(&mut self, txn: &Transaction<'_>) -> FormworkResult<()>;

    /// Upcast for downcasting to the concrete form type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete form type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<F: Form> FormNode for F {
    fn node_name(&self) -> &'static str {
        self.form_name()
    }

    fn node_model_name(&self) -> &'static str {
        self.model().borrow().model_name()
    }

    fn node_is_valid(&mut self) -> bool {
        self.is_valid()
    }

    fn node_errors(&self) -> &ErrorSet {
        self.errors()
    }

    fn save_node(&mut self, txn: &Transaction<'_>) -> bool {
        let form_errors = self.form_errors();
        if !form_errors.is_empty() {
            tracing::debug!(form = self.form_name(), errors = %form_errors, "form-level errors block save");
            return false;
        }

        let previous = self.id();
        let saved = self.model().borrow_mut().save(txn);
        undo_id_on_rollback(self.model(), previous, txn);
        if !saved {
            tracing::debug!(form = self.form_name(), "model save failed");
            return false;
        }

        self.base_mut()
            .associated
            .iter_mut()
            .all(|child| child.save_node(txn))
    }

    fn save_node_or_fail(&mut self, txn: &Transaction<'_>) -> FormworkResult<()> {
        let form_errors = self.form_errors();
        if !form_errors.is_empty() {
            return Err(FormworkError::ValidationFailed(form_errors));
        }

        let previous = self.id();
        let saved = self.model().borrow_mut().save_or_fail(txn);
        undo_id_on_rollback(self.model(), previous, txn);
        saved?;

        for child in self.base_mut().associated.iter_mut() {
            child.save_node_or_fail(txn)?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork_db::{Association, Row, Value};
    use std::cell::RefCell;
    use std::rc::Rc;

    // ── In-memory models ────────────────────────────────────────────────

    /// Hands out ids and logs every write; `fail_on` names a model whose
    /// persist step errors like a constraint violation.
    #[derive(Default)]
    struct Journal {
        log: RefCell<Vec<String>>,
        next_id: RefCell<i64>,
    }

    impl Journal {
        fn write(&self, what: &str) -> i64 {
            self.log.borrow_mut().push(what.to_string());
            let mut next = self.next_id.borrow_mut();
            *next += 1;
            *next
        }

        fn writes(&self) -> Vec<String> {
            self.log.borrow().clone()
        }
    }

    impl DbExecutor for Journal {
        fn execute_sql(&self, sql: &str, _params: &[Value]) -> FormworkResult<u64> {
            self.log.borrow_mut().push(sql.to_string());
            Ok(0)
        }

        fn query(&self, _sql: &str, _params: &[Value]) -> FormworkResult<Vec<Row>> {
            Ok(vec![])
        }
    }

    thread_local! {
        static JOURNAL: Rc<Journal> = Rc::new(Journal::default());
    }

    fn journal() -> Rc<Journal> {
        JOURNAL.with(Rc::clone)
    }

    #[derive(Debug, Default)]
    struct Team {
        id: Option<i64>,
        name: String,
        members: Vec<ModelRef<Member>>,
        captain: Option<ModelRef<Member>>,
        errors: ErrorSet,
    }

    impl ModelAdapter for Team {
        fn model_name(&self) -> &'static str {
            "Team"
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
            self.id = Some(journal().write(&format!("team {}", self.name)));
            Ok(())
        }
        fn id(&self) -> Option<i64> {
            self.id
        }
        fn set_id(&mut self, id: Option<i64>) {
            self.id = id;
        }
        fn association(&self, name: &str) -> Option<Association> {
            match name {
                "members" => Some(Association::many(&self.members)),
                "captain" => Some(Association::one(self.captain.as_ref())),
                _ => None,
            }
        }
    }

    #[derive(Debug, Default)]
    struct Member {
        id: Option<i64>,
        handle: String,
        errors: ErrorSet,
    }

    impl ModelAdapter for Member {
        fn model_name(&self) -> &'static str {
            "Member"
        }
        fn validate(&mut self) {
            self.errors = ErrorSet::new();
            if self.handle.len() < 2 {
                self.errors.add("handle", "too_short", "is too short");
            }
        }
        fn errors(&self) -> &ErrorSet {
            &self.errors
        }
        fn persist(&mut self, _db: &dyn DbExecutor) -> FormworkResult<()> {
            if self.handle == "taken" {
                return Err(FormworkError::IntegrityError("UNIQUE constraint failed: members.handle".into()));
            }
            self.id = Some(journal().write(&format!("member {}", self.handle)));
            Ok(())
        }
        fn id(&self) -> Option<i64> {
            self.id
        }
        fn set_id(&mut self, id: Option<i64>) {
            self.id = id;
        }
    }

    struct TeamForm {
        base: FormBase<Team>,
    }

    impl Form for TeamForm {
        type Model = Team;
        fn from_model(model: ModelRef<Team>) -> Self {
            Self {
                base: FormBase::new(model),
            }
        }
        fn base(&self) -> &FormBase<Team> {
            &self.base
        }
        fn base_mut(&mut self) -> &mut FormBase<Team> {
            &mut self.base
        }
    }

    struct MemberForm {
        base: FormBase<Member>,
    }

    impl Form for MemberForm {
        type Model = Member;
        fn from_model(model: ModelRef<Member>) -> Self {
            Self {
                base: FormBase::new(model),
            }
        }
        fn base(&self) -> &FormBase<Member> {
            &self.base
        }
        fn base_mut(&mut self) -> &mut FormBase<Member> {
            &mut self.base
        }
    }

    fn member(handle: &str) -> ModelRef<Member> {
        model_ref(Member {
            handle: handle.to_string(),
            ..Member::default()
        })
    }

    fn team(name: &str, handles: &[&str]) -> TeamForm {
        TeamForm::new(Team {
            name: name.to_string(),
            members: handles.iter().map(|h| member(h)).collect(),
            ..Team::default()
        })
    }

    // ── Cache identity ─────────────────────────────────────────────────

    #[test]
    fn test_associated_form_is_cached() {
        let mut form = team("rust", &["ann", "bob"]);
        let first: *const MemberForm = form.base_mut().associated_form::<MemberForm>("members", 1).unwrap();
        let second: *const MemberForm = form.base_mut().associated_form::<MemberForm>("members", 1).unwrap();
        assert_eq!(first, second);
        assert_eq!(form.base().associated_forms().len(), 1);
    }

    #[test]
    fn test_associated_form_wraps_the_shared_model() {
        let mut form = team("rust", &["ann"]);
        let shared = Rc::clone(&form.model().borrow().members[0]);
        let child = form.base_mut().associated_form::<MemberForm>("members", 0).unwrap();
        assert!(Rc::ptr_eq(child.model(), &shared));
    }

    #[test]
    fn test_writes_accumulate_on_cached_form() {
        let mut form = team("rust", &["ann"]);
        form.base_mut()
            .associated_form::<MemberForm>("members", 0)
            .unwrap()
            .model()
            .borrow_mut()
            .handle = "anne".into();
        let child = form.base_mut().associated_form::<MemberForm>("members", 0).unwrap();
        assert_eq!(child.model().borrow().handle, "anne");
    }

    #[test]
    fn test_missing_collection_entry_gets_default_model() {
        let mut form = team("rust", &[]);
        let child = form.base_mut().associated_form::<MemberForm>("members", 3).unwrap();
        assert!(child.model().borrow().handle.is_empty());
        assert!(form.base().associated_forms().contains("members", 3));
        assert!(!form.base().associated_forms().contains("members", 0));
    }

    #[test]
    fn test_to_one_indexed_past_zero_fails() {
        let mut form = team("rust", &[]);
        let err = form.base_mut().associated_form::<MemberForm>("captain", 2).err().unwrap();
        assert!(matches!(err, FormworkError::InvalidAssociationAccess { index: 2, .. }));
        assert!(form.base().associated_forms().is_empty());
    }

    #[test]
    fn test_unknown_association() {
        let mut form = team("rust", &[]);
        let err = form.base_mut().associated_form::<MemberForm>("coach", 0).err().unwrap();
        assert!(matches!(err, FormworkError::UnknownAssociation { .. }));
    }

    #[test]
    fn test_wrong_form_class_for_model() {
        let mut form = team("rust", &["ann"]);
        let err = form.base_mut().associated_form::<TeamForm>("members", 0).err().unwrap();
        assert!(matches!(err, FormworkError::MissingFormClass(_)));
    }

    #[test]
    fn test_named_form_class() {
        FormRegistry::register::<MemberForm>("MemberForm");
        let mut form = team("rust", &["ann"]);
        let node = form.base_mut().associated_form_named("members", "MemberForm", 0).unwrap();
        assert_eq!(node.node_name(), "MemberForm");
        assert!(node.as_any().downcast_ref::<MemberForm>().is_some());

        let err = form
            .base_mut()
            .associated_form_named("members", "GhostForm", 1)
            .err()
            .unwrap();
        assert!(matches!(err, FormworkError::MissingFormClass(_)));
    }

    // ── Validation ─────────────────────────────────────────────────────

    #[test]
    fn test_model_errors_copied_verbatim() {
        let mut form = team("", &[]);
        assert!(!form.is_valid());
        assert_eq!(form.errors().codes_for("name"), vec!["blank"]);
    }

    #[test]
    fn test_invalid_associated_form_adds_one_base_error() {
        let mut form = team("rust", &["a"]);
        form.base_mut().associated_form::<MemberForm>("members", 0).unwrap();
        assert!(!form.is_valid());
        assert_eq!(form.errors().len(), 1);
        assert_eq!(
            form.errors().messages_for(formwork_core::BASE_KEY),
            vec!["associated Member form has some errors"]
        );
        assert!(!form.errors().contains_key("handle"));
    }

    #[test]
    fn test_untouched_associations_are_not_validated() {
        let mut form = team("rust", &["a"]);
        assert!(form.is_valid());
    }

    #[test]
    fn test_validate_is_idempotent() {
        let mut form = team("", &["a"]);
        form.base_mut().associated_form::<MemberForm>("members", 0).unwrap();
        form.validate();
        let first = form.errors().clone();
        form.validate();
        assert_eq!(&first, form.errors());
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_input_errors_surface_and_clear() {
        let mut form = team("rust", &[]);
        form.base_mut().record_input_error("founded_on", "invalid", "is not a valid date");
        assert!(!form.is_valid());
        assert_eq!(form.errors().codes_for("founded_on"), vec!["invalid"]);

        form.base_mut().clear_input_error("founded_on");
        assert!(form.is_valid());
    }

    // ── Saving ─────────────────────────────────────────────────────────

    #[test]
    fn test_save_writes_parent_then_children_in_order() {
        let db = journal();
        let mut form = team("order", &["ann", "bob"]);
        form.base_mut().associated_form::<MemberForm>("members", 1).unwrap();
        form.base_mut().associated_form::<MemberForm>("members", 0).unwrap();

        assert!(form.save(db.as_ref()).unwrap());
        let writes = db.writes();
        let start = writes.iter().rposition(|w| w == "BEGIN").unwrap();
        assert_eq!(
            &writes[start..],
            &["BEGIN", "team order", "member bob", "member ann", "COMMIT"]
        );
        assert!(form.is_persisted());
        assert!(form.model().borrow().members.iter().all(|m| m.borrow().id.is_some()));
    }

    #[test]
    fn test_save_failure_rolls_back_and_resets_ids() {
        let db = journal();
        let mut form = team("rollback", &["ann", "taken"]);
        form.base_mut().associated_form::<MemberForm>("members", 0).unwrap();
        form.base_mut().associated_form::<MemberForm>("members", 1).unwrap();

        assert!(!form.save(db.as_ref()).unwrap());
        assert_eq!(db.writes().last().unwrap(), "ROLLBACK");
        assert!(!form.is_persisted());
        assert!(form.model().borrow().members[0].borrow().id.is_none());
    }

    #[test]
    fn test_save_invalid_child_returns_false() {
        let db = journal();
        let mut form = team("shorty", &["a"]);
        form.base_mut().associated_form::<MemberForm>("members", 0).unwrap();
        assert!(!form.save(db.as_ref()).unwrap());
        assert!(!form.is_persisted());
        // save leaves errors to an explicit validation pass
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_save_or_fail_propagates_persistence_error() {
        let db = journal();
        let mut form = team("raise", &["taken"]);
        form.base_mut().associated_form::<MemberForm>("members", 0).unwrap();
        let err = form.save_or_fail(db.as_ref()).unwrap_err();
        assert!(err.is_persistence_failure());
        assert!(!form.is_persisted());
        assert_eq!(db.writes().last().unwrap(), "ROLLBACK");
    }

    #[test]
    fn test_save_or_fail_raises_validation_failed() {
        let db = journal();
        let mut form = team("", &[]);
        let err = form.save_or_fail(db.as_ref()).unwrap_err();
        assert!(err.validation_errors().unwrap().contains_key("name"));
    }

    #[test]
    fn test_input_error_blocks_save() {
        let db = journal();
        let mut form = team("blocked", &[]);
        form.base_mut().record_input_error("founded_on", "invalid", "is not a valid date");
        assert!(!form.save(db.as_ref()).unwrap());
        assert!(!form.is_persisted());
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<TeamForm>(), "TeamForm");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
    }
}
