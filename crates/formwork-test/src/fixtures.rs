//! A small person/country/pet domain for tests and demos.
//!
//! A [`Person`] belongs to a [`Country`] and has many [`Pet`]s. Each model
//! has a matching form: [`PersonForm`] delegates the name and gender
//! attributes, parses `date_of_birth` from text, and exposes `country` and
//! `pets` as associated forms.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use chrono::NaiveDate;
use formwork_core::{ErrorSet, FormworkResult};
use formwork_db::{
    model_ref, save_record, save_shared, Association, DbExecutor, FieldValidations, Inclusion,
    Length, ModelAdapter, ModelRef, Predicate, Presence, Record, Row, Value,
};
use formwork_forms::{delegate_association, delegate_attributes, Form, FormBase, FormRegistry};

/// Tables for the fixture models.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS countries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    code TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS people (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    gender TEXT NOT NULL CHECK (length(gender) = 1),
    date_of_birth TEXT,
    country_id INTEGER NOT NULL REFERENCES countries(id)
);
CREATE TABLE IF NOT EXISTS pets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    species TEXT NOT NULL,
    owner_id INTEGER NOT NULL REFERENCES people(id),
    UNIQUE (owner_id, name)
);
";

/// The accepted `gender` values.
pub const GENDERS: [&str; 3] = ["m", "f", "o"];

/// The accepted `species` values.
pub const SPECIES: [&str; 4] = ["cat", "dog", "bird", "fish"];

/// The text format [`PersonForm::set_date_of_birth`] parses.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Registers the fixture forms under their type names.
pub fn register_forms() {
    FormRegistry::register::<PersonForm>("PersonForm");
    FormRegistry::register::<CountryForm>("CountryForm");
    FormRegistry::register::<PetForm>("PetForm");
}

// ── Country ─────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Country {
    pub id: Option<i64>,
    pub name: String,
    /// ISO 3166 alpha-2 code.
    pub code: String,
    errors: ErrorSet,
}

impl Country {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            ..Self::default()
        }
    }
}

impl Record for Country {
    fn table_name() -> &'static str {
        "countries"
    }

    fn pk(&self) -> Option<i64> {
        self.id
    }

    fn set_pk(&mut self, pk: Option<i64>) {
        self.id = pk;
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", Value::from(&self.name)),
            ("code", Value::from(&self.code)),
        ]
    }

    fn from_row(row: &Row) -> FormworkResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            code: row.get("code")?,
            errors: ErrorSet::new(),
        })
    }
}

impl ModelAdapter for Country {
    fn model_name(&self) -> &'static str {
        "Country"
    }

    fn validate(&mut self) {
        let mut errors = ErrorSet::new();
        FieldValidations::new()
            .rule("name", Presence)
            .rule("code", Presence)
            .rule("code", Length::exactly(2))
            .run(&self.field_values(), &mut errors);
        self.errors = errors;
    }

    fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    fn persist(&mut self, db: &dyn DbExecutor) -> FormworkResult<()> {
        save_record(self, db)
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }
}

// ── Person ──────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Person {
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    /// One of [`GENDERS`].
    pub gender: String,
    pub date_of_birth: Option<NaiveDate>,
    pub country: Option<ModelRef<Country>>,
    pub pets: Vec<ModelRef<Pet>>,
    errors: ErrorSet,
}

fn born_in_the_past(value: &Value) -> bool {
    match value {
        Value::Date(date) => *date < chrono::Utc::now().date_naive(),
        _ => true,
    }
}

fn person_rules() -> FieldValidations {
    FieldValidations::new()
        .rule("first_name", Presence)
        .rule("first_name", Length::between(2, 254))
        .rule("last_name", Presence)
        .rule("last_name", Length::between(2, 254))
        .rule("gender", Presence)
        .rule("gender", Length::exactly(1))
        .rule(
            "gender",
            Inclusion::new(GENDERS).with_message("one of m (male), f (female), or o (other)"),
        )
        .rule("date_of_birth", Presence)
        .rule(
            "date_of_birth",
            Predicate::new("InThePast", "in_the_past", "must be in the past", born_in_the_past),
        )
        .rule("country", Presence)
}

impl Person {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        gender: impl Into<String>,
        date_of_birth: NaiveDate,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            gender: gender.into(),
            date_of_birth: Some(date_of_birth),
            ..Self::default()
        }
    }

    /// Sets the country, builder style.
    #[must_use]
    pub fn with_country(mut self, country: Country) -> Self {
        self.country = Some(model_ref(country));
        self
    }

    /// Appends a new pet owned by `this`.
    pub fn add_pet(this: &ModelRef<Self>, name: &str, species: &str) -> ModelRef<Pet> {
        let pet = model_ref(Pet {
            name: name.to_string(),
            species: species.to_string(),
            owner: Rc::downgrade(this),
            ..Pet::default()
        });
        this.borrow_mut().pets.push(Rc::clone(&pet));
        pet
    }

    /// `"First Last"`, or `"Last, First"` when `inversed`.
    pub fn full_name(&self, inversed: bool) -> String {
        if inversed {
            format!("{}, {}", self.last_name, self.first_name)
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    fn country_id(&self) -> Option<i64> {
        self.country.as_ref().and_then(|c| c.borrow().id)
    }
}

impl Record for Person {
    fn table_name() -> &'static str {
        "people"
    }

    fn pk(&self) -> Option<i64> {
        self.id
    }

    fn set_pk(&mut self, pk: Option<i64>) {
        self.id = pk;
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("first_name", Value::from(&self.first_name)),
            ("last_name", Value::from(&self.last_name)),
            ("gender", Value::from(&self.gender)),
            ("date_of_birth", Value::from(self.date_of_birth)),
            ("country_id", Value::from(self.country_id())),
        ]
    }

    fn from_row(row: &Row) -> FormworkResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            gender: row.get("gender")?,
            date_of_birth: row.get("date_of_birth")?,
            ..Self::default()
        })
    }
}

impl ModelAdapter for Person {
    fn model_name(&self) -> &'static str {
        "Person"
    }

    fn validate(&mut self) {
        let mut values = self.field_values();
        values.push(("country", Value::from(self.country.is_some().then_some(true))));

        let mut errors = ErrorSet::new();
        person_rules().run(&values, &mut errors);
        self.errors = errors;
    }

    fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    /// Writes a new country first, then the person.
    fn persist(&mut self, db: &dyn DbExecutor) -> FormworkResult<()> {
        if let Some(country) = &self.country {
            let is_new = !country.borrow().is_persisted();
            if is_new {
                save_shared(country, db)?;
            }
        }
        save_record(self, db)
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn association(&self, name: &str) -> Option<Association> {
        match name {
            "country" => Some(Association::one(self.country.as_ref())),
            "pets" => Some(Association::many(&self.pets)),
            _ => None,
        }
    }
}

// ── Pet ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Pet {
    pub id: Option<i64>,
    pub name: String,
    /// One of [`SPECIES`].
    pub species: String,
    pub owner: Weak<RefCell<Person>>,
    errors: ErrorSet,
}

impl Pet {
    fn owner_id(&self) -> Option<i64> {
        self.owner.upgrade().and_then(|owner| owner.borrow().id)
    }
}

impl Record for Pet {
    fn table_name() -> &'static str {
        "pets"
    }

    fn pk(&self) -> Option<i64> {
        self.id
    }

    fn set_pk(&mut self, pk: Option<i64>) {
        self.id = pk;
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", Value::from(&self.name)),
            ("species", Value::from(&self.species)),
            ("owner_id", Value::from(self.owner_id())),
        ]
    }

    fn from_row(row: &Row) -> FormworkResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            species: row.get("species")?,
            ..Self::default()
        })
    }
}

impl ModelAdapter for Pet {
    fn model_name(&self) -> &'static str {
        "Pet"
    }

    fn validate(&mut self) {
        let mut errors = ErrorSet::new();
        FieldValidations::new()
            .rule("name", Presence)
            .rule("species", Presence)
            .rule("species", Inclusion::new(SPECIES))
            .run(&self.field_values(), &mut errors);
        self.errors = errors;
    }

    fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    fn persist(&mut self, db: &dyn DbExecutor) -> FormworkResult<()> {
        save_record(self, db)
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }
}

// ── Forms ───────────────────────────────────────────────────────────────

pub struct CountryForm {
    base: FormBase<Country>,
}

impl Form for CountryForm {
    type Model = Country;

    fn from_model(model: ModelRef<Country>) -> Self {
        Self {
            base: FormBase::new(model),
        }
    }

    fn base(&self) -> &FormBase<Country> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut FormBase<Country> {
        &mut self.base
    }
}

delegate_attributes! {
    CountryForm {
        name / set_name: String,
        code / set_code: String,
    }
}

pub struct PetForm {
    base: FormBase<Pet>,
}

impl Form for PetForm {
    type Model = Pet;

    fn from_model(model: ModelRef<Pet>) -> Self {
        Self {
            base: FormBase::new(model),
        }
    }

    fn base(&self) -> &FormBase<Pet> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut FormBase<Pet> {
        &mut self.base
    }
}

delegate_attributes! {
    PetForm {
        name / set_name: String,
        species / set_species: String,
    }
}

/// The form for a [`Person`].
pub struct PersonForm {
    base: FormBase<Person>,
}

impl Form for PersonForm {
    type Model = Person;

    fn from_model(model: ModelRef<Person>) -> Self {
        Self {
            base: FormBase::new(model),
        }
    }

    fn base(&self) -> &FormBase<Person> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut FormBase<Person> {
        &mut self.base
    }
}

delegate_attributes! {
    PersonForm {
        first_name / set_first_name: String,
        last_name / set_last_name: String,
        gender / set_gender: String,
        reader date_of_birth: Option<NaiveDate>,
    }
}

delegate_association! {
    PersonForm {
        country => CountryForm,
        pets => PetForm,
    }
}

impl PersonForm {
    /// Parses `input` as `YYYY-MM-DD`.
    ///
    /// Blank input clears the date. Unparseable input leaves the model as it
    /// was and records an `invalid_date` error for the next validation.
    pub fn set_date_of_birth(&mut self, input: &str) {
        let input = input.trim();
        let parsed = if input.is_empty() {
            Ok(None)
        } else {
            NaiveDate::parse_from_str(input, DATE_FORMAT).map(Some)
        };

        match parsed {
            Ok(date) => {
                let base = self.base_mut();
                base.clear_input_error("date_of_birth");
                base.model().borrow_mut().date_of_birth = date;
            }
            Err(e) => {
                tracing::debug!(input, error = %e, "unparseable date of birth");
                self.base_mut().record_input_error(
                    "date_of_birth",
                    "invalid_date",
                    "is not a valid date (expected YYYY-MM-DD)",
                );
            }
        }
    }

    /// The person's full name, see [`Person::full_name`].
    pub fn full_name(&self, inversed: bool) -> String {
        self.model().borrow().full_name(inversed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn valid_person() -> Person {
        Person::new("Ada", "Lovelace", "f", date(1815, 12, 10)).with_country(Country::new("United Kingdom", "GB"))
    }

    #[test]
    fn test_valid_person() {
        let mut person = valid_person();
        assert!(person.is_valid(), "{}", person.errors());
    }

    #[test]
    fn test_person_rules() {
        let mut person = Person {
            first_name: "A".into(),
            gender: "x".into(),
            date_of_birth: Some(chrono::Utc::now().date_naive() + chrono::Days::new(1)),
            ..Person::default()
        };
        person.validate();
        let errors = person.errors();
        assert_eq!(errors.codes_for("first_name"), vec!["too_short"]);
        assert_eq!(errors.codes_for("last_name"), vec!["blank", "too_short"]);
        assert_eq!(
            errors.messages_for("gender"),
            vec!["one of m (male), f (female), or o (other)"]
        );
        assert_eq!(errors.codes_for("date_of_birth"), vec!["in_the_past"]);
        assert_eq!(errors.codes_for("country"), vec!["blank"]);
    }

    #[test]
    fn test_full_name() {
        let person = valid_person();
        assert_eq!(person.full_name(false), "Ada Lovelace");
        assert_eq!(person.full_name(true), "Lovelace, Ada");
    }

    #[test]
    fn test_pet_reads_owner_id() {
        let owner = model_ref(valid_person());
        let pet = Person::add_pet(&owner, "Tom", "cat");
        assert_eq!(pet.borrow().owner_id(), None);
        owner.borrow_mut().id = Some(7);
        assert_eq!(pet.borrow().owner_id(), Some(7));
    }

    #[test]
    fn test_associated_forms_start_unmaterialized() {
        let mut form = PersonForm::new(valid_person());
        assert!(form.base().associated_forms().is_empty());

        form.country(0).unwrap();
        assert!(form.base().associated_forms().contains("country", 0));
    }

    #[test]
    fn test_set_date_of_birth() {
        let mut form = PersonForm::new(valid_person());
        form.set_date_of_birth("1990-05-17");
        assert_eq!(form.date_of_birth(), Some(date(1990, 5, 17)));

        form.set_date_of_birth("17/05/1990");
        assert_eq!(form.date_of_birth(), Some(date(1990, 5, 17)));
        assert_eq!(
            form.base().input_errors().codes_for("date_of_birth"),
            vec!["invalid_date"]
        );

        form.set_date_of_birth("");
        assert_eq!(form.date_of_birth(), None);
        assert!(form.base().input_errors().is_empty());
    }

    #[test]
    fn test_register_forms() {
        register_forms();
        for name in ["PersonForm", "CountryForm", "PetForm"] {
            assert!(FormRegistry::is_registered(name));
        }
    }
}
