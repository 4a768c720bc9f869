//! Declaration macros for form accessors.
//!
//! [`delegate_attributes!`](crate::delegate_attributes) generates
//! pass-through readers and writers that forward to the backing model's
//! fields. [`delegate_association!`](crate::delegate_association) generates
//! one accessor per relation that returns the cached associated form.
//!
//! Custom attributes (those needing parsing) are plain methods on the form;
//! on bad input they call
//! [`FormBase::record_input_error`](crate::FormBase::record_input_error)
//! instead of touching the model.

/// Generates pass-through attribute accessors on a form type.
///
/// Each entry is one of:
///
/// - `field / setter: Type` for a reader and a writer
/// - `reader field: Type` for a reader only
/// - `writer setter(field): Type` for a writer only
///
/// Readers return a clone of the model's field. Writers accept anything
/// `Into<Type>`, assign it to the model, and clear any pending input error
/// recorded for the field.
///
/// ```ignore
/// delegate_attributes! {
///     PersonForm {
///         first_name / set_first_name: String,
///         reader last_name: String,
///         writer set_gender(gender): String,
///     }
/// }
/// ```
#[macro_export]
macro_rules! delegate_attributes {
    (@items) => {};

    (@items reader $field:ident : $ty:ty $(, $($rest:tt)*)?) => {
        $crate::delegate_attributes!(@reader $field: $ty);
        $crate::delegate_attributes!(@items $($($rest)*)?);
    };

    (@items writer $setter:ident ( $field:ident ) : $ty:ty $(, $($rest:tt)*)?) => {
        $crate::delegate_attributes!(@writer $setter($field): $ty);
        $crate::delegate_attributes!(@items $($($rest)*)?);
    };

    (@items $field:ident / $setter:ident : $ty:ty $(, $($rest:tt)*)?) => {
        $crate::delegate_attributes!(@reader $field: $ty);
        $crate::delegate_attributes!(@writer $setter($field): $ty);
        $crate::delegate_attributes!(@items $($($rest)*)?);
    };

    (@reader $field:ident : $ty:ty) => {
        #[doc = concat!("Returns the model's `", stringify!($field), "`.")]
        pub fn $field(&self) -> $ty {
            ::std::clone::Clone::clone(&::std::cell::RefCell::borrow($crate::Form::model(self)).$field)
        }
    };

    (@writer $setter:ident ( $field:ident ) : $ty:ty) => {
        #[doc = concat!("Sets the model's `", stringify!($field), "`.")]
        pub fn $setter(&mut self, value: impl ::std::convert::Into<$ty>) {
            let base = $crate::Form::base_mut(self);
            base.clear_input_error(stringify!($field));
            ::std::cell::RefCell::borrow_mut(base.model()).$field = value.into();
        }
    };

    ($form:ty { $($body:tt)* }) => {
        impl $form {
            $crate::delegate_attributes!(@items $($body)*);
        }
    };
}

/// Generates associated-form accessors on a form type.
///
/// Each entry maps a relation name either to a form type, producing
/// `fn relation(&mut self, index: usize) -> FormworkResult<&mut FormType>`,
/// or to a registered class name (a string literal), producing
/// `fn relation(&mut self, index: usize) -> FormworkResult<&mut dyn FormNode>`.
///
/// ```ignore
/// delegate_association! {
///     PersonForm {
///         country => CountryForm,
///         pets => "PetForm",
///     }
/// }
///
/// let country_form = person_form.country(0)?;
/// ```
#[macro_export]
macro_rules! delegate_association {
    (@items) => {};

    (@items $name:ident => $class:literal $(, $($rest:tt)*)?) => {
        #[doc = concat!("Returns the associated form for `", stringify!($name), "` at `index`.")]
        pub fn $name(
            &mut self,
            index: usize,
        ) -> $crate::FormworkResult<&mut dyn $crate::FormNode> {
            $crate::Form::base_mut(self).associated_form_named(stringify!($name), $class, index)
        }
        $crate::delegate_association!(@items $($($rest)*)?);
    };

    (@items $name:ident => $target:ty $(, $($rest:tt)*)?) => {
        #[doc = concat!("Returns the associated form for `", stringify!($name), "` at `index`.")]
        pub fn $name(&mut self, index: usize) -> $crate::FormworkResult<&mut $target> {
            $crate::Form::base_mut(self).associated_form::<$target>(stringify!($name), index)
        }
        $crate::delegate_association!(@items $($($rest)*)?);
    };

    ($form:ty { $($body:tt)* }) => {
        impl $form {
            $crate::delegate_association!(@items $($body)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{Form, FormBase, FormworkError};
    use formwork_core::{ErrorSet, FormworkResult};
    use formwork_db::{Association, DbExecutor, ModelAdapter, ModelRef};

    #[derive(Debug, Default)]
    struct Book {
        id: Option<i64>,
        title: String,
        pages: i64,
        isbn: Option<String>,
        sequel: Option<ModelRef<Book>>,
        errors: ErrorSet,
    }

    impl ModelAdapter for Book {
        fn model_name(&self) -> &'static str {
            "Book"
        }
        fn validate(&mut self) {
            self.errors = ErrorSet::new();
        }
        fn errors(&self) -> &ErrorSet {
            &self.errors
        }
        fn persist(&mut self, _db: &dyn DbExecutor) -> FormworkResult<()> {
            Ok(())
        }
        fn id(&self) -> Option<i64> {
            self.id
        }
        fn set_id(&mut self, id: Option<i64>) {
            self.id = id;
        }
        fn association(&self, name: &str) -> Option<Association> {
            (name == "sequel").then(|| Association::one(self.sequel.as_ref()))
        }
    }

    struct BookForm {
        base: FormBase<Book>,
    }

    impl Form for BookForm {
        type Model = Book;
        fn from_model(model: ModelRef<Book>) -> Self {
            Self {
                base: FormBase::new(model),
            }
        }
        fn base(&self) -> &FormBase<Book> {
            &self.base
        }
        fn base_mut(&mut self) -> &mut FormBase<Book> {
            &mut self.base
        }
    }

    delegate_attributes! {
        BookForm {
            title / set_title: String,
            reader pages: i64,
            writer set_isbn(isbn): Option<String>,
        }
    }

    delegate_association! {
        BookForm {
            sequel => BookForm,
        }
    }

    #[test]
    fn test_reader_and_writer_forward_to_model() {
        let mut form = BookForm::new(Book {
            pages: 320,
            ..Book::default()
        });
        form.set_title("Dune");
        assert_eq!(form.title(), "Dune");
        assert_eq!(form.model().borrow().title, "Dune");
        assert_eq!(form.pages(), 320);
    }

    #[test]
    fn test_writer_only_attribute() {
        let mut form = BookForm::new(Book::default());
        form.set_isbn(Some("978-0441013593".to_string()));
        assert_eq!(form.model().borrow().isbn.as_deref(), Some("978-0441013593"));
    }

    #[test]
    fn test_writer_clears_pending_input_error() {
        let mut form = BookForm::new(Book::default());
        form.base_mut().record_input_error("title", "invalid", "is garbled");
        form.set_title("Dune Messiah");
        assert!(form.base().input_errors().is_empty());
    }

    #[test]
    fn test_association_accessor_is_cached() {
        let mut form = BookForm::new(Book::default());
        form.sequel(0).unwrap().set_title("Children of Dune");
        assert_eq!(form.sequel(0).unwrap().title(), "Children of Dune");
        assert!(matches!(
            form.sequel(1).err().unwrap(),
            FormworkError::InvalidAssociationAccess { .. }
        ));
    }
}
