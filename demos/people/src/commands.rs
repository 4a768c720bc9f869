//! What the `people` subcommands do, independent of argument parsing.

use formwork_core::FormworkResult;
use formwork_db::{model_ref, DbExecutor, Record, Value};
use formwork_forms::Form;
use formwork_test::fixtures::{Country, Person, PersonForm, SCHEMA};
use formwork_views::{Link, Presenter, RenderOptions, ViewContext};
use serde_json::{json, Value as Json};

/// Input for [`add_person`], as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct NewPerson {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub date_of_birth: String,
    pub country: String,
    pub country_code: String,
    /// `(name, species)` pairs.
    pub pets: Vec<(String, String)>,
}

/// The result of [`add_person`].
#[derive(Debug)]
pub enum AddOutcome {
    Saved { id: i64, full_name: String },
    /// Nothing was written; the payload is a JSON error report.
    Rejected(Json),
}

/// Runs the schema statements. They are idempotent.
pub fn migrate(db: &formwork_db_backends::SqliteBackend) -> FormworkResult<()> {
    db.execute_batch(SCHEMA)
}

fn find_country(db: &dyn DbExecutor, name: &str) -> FormworkResult<Option<Country>> {
    let rows = db.query(
        "SELECT * FROM countries WHERE name = ?",
        &[Value::from(name)],
    )?;
    rows.first().map(Country::from_row).transpose()
}

/// Saves a person with their country and pets in one transaction.
///
/// An existing country with the same name is reused.
pub fn add_person(db: &dyn DbExecutor, input: &NewPerson) -> FormworkResult<AddOutcome> {
    let country = match find_country(db, &input.country)? {
        Some(country) => country,
        None => Country::new(&input.country, &input.country_code),
    };

    let person = model_ref(Person::default());
    person.borrow_mut().country = Some(model_ref(country));
    for (name, species) in &input.pets {
        Person::add_pet(&person, name, species);
    }

    let mut form = PersonForm::from_model(person);
    form.set_first_name(input.first_name.as_str());
    form.set_last_name(input.last_name.as_str());
    form.set_gender(input.gender.as_str());
    form.set_date_of_birth(&input.date_of_birth);
    form.country(0)?;
    for index in 0..input.pets.len() {
        form.pets(index)?;
    }

    if form.save(db)? {
        let id = form.id().unwrap_or_default();
        tracing::info!(id, "person added");
        return Ok(AddOutcome::Saved {
            id,
            full_name: form.full_name(false),
        });
    }

    Ok(AddOutcome::Rejected(rejection_report(&mut form)?))
}

fn rejection_report(form: &mut PersonForm) -> FormworkResult<Json> {
    if form.is_valid() {
        return Ok(json!({
            "errors": [{ "field": "base", "code": "not_stored", "message": "could not be stored" }],
        }));
    }

    let country = form.country(0)?.errors().clone();
    let mut pets = Vec::new();
    let mut index = 0;
    while form.base().associated_forms().contains("pets", index) {
        pets.push(json!(form.pets(index)?.errors()));
        index += 1;
    }

    Ok(json!({
        "errors": form.errors(),
        "country": country,
        "pets": pets,
    }))
}

/// Returns every stored person as `"Last, First (Country)"`, by last name.
pub fn list_people(db: &dyn DbExecutor) -> FormworkResult<Vec<String>> {
    let rows = db.query(
        "SELECT people.*, countries.name AS country_name FROM people \
         JOIN countries ON countries.id = people.country_id \
         ORDER BY people.last_name, people.first_name",
        &[],
    )?;

    rows.iter()
        .map(|row| {
            let person = Person::from_row(row)?;
            let country: String = row.get("country_name")?;
            Ok(format!("{} ({country})", person.full_name(true)))
        })
        .collect()
}

/// Renders the admin navigation as seen from `request_path`.
pub fn render_navigation(request_path: &str) -> FormworkResult<String> {
    let view = ViewContext::new(request_path);
    let options = RenderOptions::new();
    let items = [
        Link::new("People", "/people"),
        Link::new("Countries", "/countries"),
        Link::new("Pets", "/pets").with_css_classes(["secondary"]),
    ]
    .into_iter()
    .map(|link| Presenter::with_view(link, view.clone()).render(None, &options))
    .collect::<FormworkResult<Vec<_>>>()?;

    Ok(format!("<ul class=\"nav\">{}</ul>", items.concat()))
}
