//! End-to-end tests against an in-memory SQLite database.
//!
//! The entity types here mirror a small issue-tracker domain: users own
//! problems, and users can reinforce problems through a pivot table.

use crate::error::{OrmError, OrmResult};
use crate::model::{ActiveRecord, Errors, Record};
use crate::relations::{BelongsTo, BelongsToMany, HasMany};
use crate::sqlite::SqliteConnection;
use crate::value::Value;
use crate::{Order, QueryBuilder, validations};

fn connection() -> SqliteConnection {
    let db = SqliteConnection::open_in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            email TEXT
        );
        CREATE TABLE problems (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT,
            user_id INTEGER
        );
        CREATE TABLE problem_user_reinforce (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            problem_id INTEGER,
            user_id INTEGER
        );",
    )
    .unwrap();
    db
}

#[derive(Debug, Default)]
struct User {
    id: Option<i64>,
    name: Option<String>,
    email: Option<String>,
    errors: Errors,
}

impl Record for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["name", "email"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn attribute(&self, column: &str) -> OrmResult<Value> {
        match column {
            "name" => Ok(self.name.clone().into()),
            "email" => Ok(self.email.clone().into()),
            other => Err(OrmError::unknown_attribute(Self::TABLE, other)),
        }
    }

    fn set_attribute(&mut self, column: &str, value: Value) -> OrmResult<()> {
        match column {
            "name" => self.name = value.decode(column)?,
            "email" => self.email = value.decode(column)?,
            other => return Err(OrmError::unknown_attribute(Self::TABLE, other)),
        }
        Ok(())
    }

    fn errors(&self) -> &Errors {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }

    fn validate(&mut self) {
        validations::not_empty("name", self);
        validations::not_empty("email", self);
        validations::email_format("email", self);
    }
}

impl User {
    fn named(name: &str, email: &str) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            ..Default::default()
        }
    }

    fn problems(&self) -> HasMany<'_, Self, Problem> {
        self.has_many("user_id")
    }

    fn reinforced_problems(&self) -> BelongsToMany<'_, Self, Problem> {
        self.belongs_to_many("problem_user_reinforce", "user_id", "problem_id")
    }
}

#[derive(Debug, Default)]
struct Problem {
    id: Option<i64>,
    title: Option<String>,
    user_id: Option<i64>,
    errors: Errors,
}

impl Record for Problem {
    const TABLE: &'static str = "problems";
    const COLUMNS: &'static [&'static str] = &["title", "user_id"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn attribute(&self, column: &str) -> OrmResult<Value> {
        match column {
            "title" => Ok(self.title.clone().into()),
            "user_id" => Ok(self.user_id.into()),
            other => Err(OrmError::unknown_attribute(Self::TABLE, other)),
        }
    }

    fn set_attribute(&mut self, column: &str, value: Value) -> OrmResult<()> {
        match column {
            "title" => self.title = value.decode(column)?,
            "user_id" => self.user_id = value.decode(column)?,
            other => return Err(OrmError::unknown_attribute(Self::TABLE, other)),
        }
        Ok(())
    }

    fn errors(&self) -> &Errors {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }

    fn validate(&mut self) {
        validations::not_empty("title", self);
    }
}

impl Problem {
    fn titled(title: &str) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    fn user(&self) -> BelongsTo<'_, Self, User> {
        self.belongs_to("user_id")
    }

    fn reinforced_by(&self) -> BelongsToMany<'_, Self, User> {
        self.belongs_to_many("problem_user_reinforce", "problem_id", "user_id")
    }
}

#[derive(Debug, Default)]
struct ProblemUserReinforce {
    id: Option<i64>,
    problem_id: Option<i64>,
    user_id: Option<i64>,
    errors: Errors,
}

impl Record for ProblemUserReinforce {
    const TABLE: &'static str = "problem_user_reinforce";
    const COLUMNS: &'static [&'static str] = &["problem_id", "user_id"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn attribute(&self, column: &str) -> OrmResult<Value> {
        match column {
            "problem_id" => Ok(self.problem_id.into()),
            "user_id" => Ok(self.user_id.into()),
            other => Err(OrmError::unknown_attribute(Self::TABLE, other)),
        }
    }

    fn set_attribute(&mut self, column: &str, value: Value) -> OrmResult<()> {
        match column {
            "problem_id" => self.problem_id = value.decode(column)?,
            "user_id" => self.user_id = value.decode(column)?,
            other => return Err(OrmError::unknown_attribute(Self::TABLE, other)),
        }
        Ok(())
    }

    fn errors(&self) -> &Errors {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }
}

fn reinforce(db: &SqliteConnection, user: &User, problem: &Problem) -> ProblemUserReinforce {
    let mut link = ProblemUserReinforce {
        problem_id: problem.id(),
        user_id: user.id(),
        ..Default::default()
    };
    assert!(link.save(db).unwrap());
    link
}

// ==================== Record lifecycle ====================

#[test]
fn save_assigns_id_and_round_trips() {
    let db = connection();

    let mut problem = Problem::titled("X");
    assert!(problem.new_record());
    assert!(problem.save(&db).unwrap());
    assert!(!problem.new_record());

    let id = problem.id().unwrap();
    let found = Problem::find_by_id(&db, id).unwrap().unwrap();
    assert_eq!(found.id(), Some(id));
    assert_eq!(found.title.as_deref(), Some("X"));
}

#[test]
fn invalid_record_save_returns_false_with_field_errors() {
    let db = connection();

    let mut problem = Problem::default();
    assert!(!problem.save(&db).unwrap());
    assert!(problem.new_record());
    assert_eq!(problem.errors().get("title"), Some("can't be blank"));
    assert!(Problem::all(&db).unwrap().is_empty());

    let mut user = User::default();
    assert!(!user.save(&db).unwrap());
    assert!(user.errors().get("name").is_some());
    assert!(user.errors().get("email").is_some());
}

#[test]
fn validation_errors_reset_between_passes() {
    let mut problem = Problem::default();
    assert!(!problem.is_valid());
    assert_eq!(problem.errors().len(), 1);

    problem.title = Some("fixed".into());
    assert!(problem.is_valid());
    assert!(problem.errors().is_empty());
}

#[test]
fn save_on_persisted_record_updates_the_row() {
    let db = connection();

    let mut problem = Problem::titled("before");
    assert!(problem.save(&db).unwrap());
    let id = problem.id().unwrap();

    problem.title = Some("after".into());
    assert!(problem.save(&db).unwrap());
    assert_eq!(problem.id(), Some(id));

    let found = Problem::find_by_id(&db, id).unwrap().unwrap();
    assert_eq!(found.title.as_deref(), Some("after"));
    assert_eq!(Problem::all(&db).unwrap().len(), 1);
}

#[test]
fn save_reports_failure_when_the_row_vanished() {
    let db = connection();

    let mut problem = Problem::titled("X");
    assert!(problem.save(&db).unwrap());

    QueryBuilder::delete(Problem::TABLE)
        .where_eq("id", problem.id().unwrap())
        .unwrap()
        .execute(&db)
        .unwrap();

    assert!(!problem.save(&db).unwrap());
}

#[test]
fn update_merges_changes_and_bypasses_validation() {
    let db = connection();

    let mut problem = Problem::titled("X");
    assert!(problem.save(&db).unwrap());
    let id = problem.id().unwrap();

    assert!(problem.update(&db, &[("title", Value::Null)]).unwrap());
    assert_eq!(problem.title, None);

    let found = Problem::find_by_id(&db, id).unwrap().unwrap();
    assert_eq!(found.title, None);
}

#[test]
fn update_on_unsaved_record_is_a_configuration_error() {
    let db = connection();
    let mut problem = Problem::titled("X");
    let err = problem.update(&db, &[("title", "Y".into())]).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn destroy_removes_exactly_one_row() {
    let db = connection();

    let mut keep = Problem::titled("keep");
    let mut gone = Problem::titled("gone");
    assert!(keep.save(&db).unwrap());
    assert!(gone.save(&db).unwrap());
    assert_eq!(Problem::all(&db).unwrap().len(), 2);

    assert!(gone.destroy(&db).unwrap());
    assert!(Problem::find_by_id(&db, gone.id().unwrap()).unwrap().is_none());
    assert_eq!(Problem::all(&db).unwrap().len(), 1);

    // The row is already gone; a second destroy removes nothing.
    assert!(!gone.destroy(&db).unwrap());
}

#[test]
fn destroy_on_unsaved_record_is_a_configuration_error() {
    let db = connection();
    let problem = Problem::titled("X");
    assert!(problem.destroy(&db).unwrap_err().is_configuration());
}

// ==================== Finders ====================

#[test]
fn filter_find_by_and_exists() {
    let db = connection();

    let mut alice = User::named("Alice", "alice@example.com");
    let mut bob = User::named("Bob", "bob@example.com");
    assert!(alice.save(&db).unwrap());
    assert!(bob.save(&db).unwrap());

    let matches = User::filter(&db, &[("name", "Alice".into())]).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].email.as_deref(), Some("alice@example.com"));

    let found = User::find_by(&db, &[("email", "bob@example.com".into())])
        .unwrap()
        .unwrap();
    assert_eq!(found.name.as_deref(), Some("Bob"));

    assert!(User::find_by(&db, &[("email", "nobody@example.com".into())])
        .unwrap()
        .is_none());

    assert!(User::exists(&db, &[("name", "Alice".into())]).unwrap());
    assert!(!User::exists(&db, &[("name", "Carol".into())]).unwrap());
}

#[test]
fn find_by_id_or_fail_raises_not_found() {
    let db = connection();
    let err = Problem::find_by_id_or_fail(&db, 42).unwrap_err();
    assert!(err.is_not_found());
}

// ==================== Pagination ====================

#[test]
fn pagination_splits_ten_rows_into_two_pages() {
    let db = connection();
    for i in 0..10 {
        assert!(Problem::titled(&format!("p{i}")).save(&db).unwrap());
    }

    let page = Problem::paginate(&db, 1, 5).unwrap();
    assert_eq!(page.total_records(), 10);
    assert_eq!(page.total_pages(), 2);
    assert_eq!(page.records_on_page(), 5);
    assert!(!page.has_previous_page());
    assert!(page.has_next_page());
    assert_eq!(page.entries_info(), "Showing 1 - 5 of 10");
}

#[test]
fn pagination_rounds_partial_pages_up() {
    let db = connection();
    for i in 0..11 {
        assert!(Problem::titled(&format!("p{i}")).save(&db).unwrap());
    }

    let page = Problem::paginate(&db, 3, 5).unwrap();
    assert_eq!(page.total_pages(), 3);
    assert_eq!(page.records_on_page(), 1);
    assert!(!page.has_next_page());
    assert!(page.has_previous_page());
    assert_eq!(page.entries_info(), "Showing 11 - 11 of 11");
}

#[test]
fn pagination_rejects_zero_page() {
    let db = connection();
    assert!(Problem::paginate(&db, 0, 5).unwrap_err().is_configuration());
}

// ==================== Relationships ====================

#[test]
fn belongs_to_resolves_the_parent() {
    let db = connection();

    let mut user = User::named("Alice", "alice@example.com");
    assert!(user.save(&db).unwrap());

    let mut problem = Problem::titled("owned");
    problem.user_id = user.id();
    assert!(problem.save(&db).unwrap());

    let parent = problem.user().get(&db).unwrap().unwrap();
    assert_eq!(parent.id(), user.id());
    assert_eq!(parent.name.as_deref(), Some("Alice"));
}

#[test]
fn belongs_to_is_none_for_null_or_dangling_keys() {
    let db = connection();

    let mut orphan = Problem::titled("orphan");
    assert!(orphan.save(&db).unwrap());
    assert!(orphan.user().get(&db).unwrap().is_none());

    let mut dangling = Problem::titled("dangling");
    dangling.user_id = Some(999);
    assert!(dangling.save(&db).unwrap());
    assert!(dangling.user().get(&db).unwrap().is_none());
}

#[test]
fn has_many_returns_only_the_owners_children() {
    let db = connection();

    let mut alice = User::named("Alice", "alice@example.com");
    let mut bob = User::named("Bob", "bob@example.com");
    assert!(alice.save(&db).unwrap());
    assert!(bob.save(&db).unwrap());

    for title in ["a1", "a2"] {
        let mut problem = Problem::titled(title);
        problem.user_id = alice.id();
        assert!(problem.save(&db).unwrap());
    }
    let mut other = Problem::titled("b1");
    other.user_id = bob.id();
    assert!(other.save(&db).unwrap());

    let children = alice.problems().get(&db).unwrap();
    assert_eq!(children.len(), 2);
    assert!(children.iter().all(|p| p.user_id == alice.id()));
    assert_eq!(alice.problems().count(&db).unwrap(), 2);

    let unsaved = User::named("Carol", "carol@example.com");
    assert!(unsaved.problems().get(&db).unwrap().is_empty());
}

#[test]
fn has_many_build_prepopulates_the_foreign_key() {
    let db = connection();

    let mut user = User::named("Alice", "alice@example.com");
    assert!(user.save(&db).unwrap());

    let mut child: Problem = user.problems().build().unwrap();
    assert_eq!(child.user_id, user.id());
    child.title = Some("built".into());
    assert!(child.save(&db).unwrap());

    let unsaved = User::named("Carol", "carol@example.com");
    let err = unsaved.problems().build().unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn belongs_to_many_count_always_matches_get() {
    let db = connection();

    let mut user = User::named("Alice", "alice@example.com");
    assert!(user.save(&db).unwrap());

    let mut problems = Vec::new();
    for title in ["p1", "p2", "p3"] {
        let mut problem = Problem::titled(title);
        assert!(problem.save(&db).unwrap());
        problems.push(problem);
    }

    assert_eq!(user.reinforced_problems().get(&db).unwrap().len(), 0);
    assert_eq!(user.reinforced_problems().count(&db).unwrap(), 0);

    let link1 = reinforce(&db, &user, &problems[0]);
    let _link2 = reinforce(&db, &user, &problems[1]);

    let related = user.reinforced_problems().get(&db).unwrap();
    assert_eq!(related.len(), 2);
    assert_eq!(user.reinforced_problems().count(&db).unwrap(), 2);

    assert!(link1.destroy(&db).unwrap());
    let related = user.reinforced_problems().get(&db).unwrap();
    assert_eq!(related.len(), 1);
    assert_eq!(user.reinforced_problems().count(&db).unwrap(), 1);
    assert_eq!(related[0].title.as_deref(), Some("p2"));
}

#[test]
fn belongs_to_many_materializes_related_ids_not_pivot_ids() {
    let db = connection();

    let mut user = User::named("Alice", "alice@example.com");
    assert!(user.save(&db).unwrap());

    // Push the pivot's own ids out of sync with the related table's ids.
    db.execute_batch("INSERT INTO problem_user_reinforce (problem_id, user_id) VALUES (99, 99);")
        .unwrap();

    let mut problem = Problem::titled("p1");
    assert!(problem.save(&db).unwrap());
    reinforce(&db, &user, &problem);

    let related = user.reinforced_problems().get(&db).unwrap();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].id(), problem.id());

    let reinforcers = problem.reinforced_by().get(&db).unwrap();
    assert_eq!(reinforcers.len(), 1);
    assert_eq!(reinforcers[0].id(), user.id());
}

// ==================== Builder against live data ====================

#[test]
fn builder_reads_shape_results() {
    let db = connection();
    for (title, user_id) in [("a", 1i64), ("b", 1), ("c", 2)] {
        QueryBuilder::table("problems")
            .insert_data(&db, &[("title", title.into()), ("user_id", user_id.into())])
            .unwrap();
    }

    let counted = QueryBuilder::table("problems")
        .where_eq("user_id", 1)
        .unwrap();
    assert_eq!(counted.count(&db).unwrap(), 2);
    assert!(counted.exists(&db).unwrap());

    // first() must not disturb the builder's own limit.
    let qb = QueryBuilder::table("problems")
        .where_eq("user_id", 1)
        .unwrap()
        .order_by("id", Order::Asc)
        .unwrap();
    let first = qb.first(&db).unwrap().unwrap();
    assert_eq!(first.try_get::<String>("title").unwrap(), "a");
    assert_eq!(qb.get(&db).unwrap().len(), 2);

    let titles = QueryBuilder::table("problems")
        .order_by_desc("title")
        .unwrap()
        .pluck(&db, "title")
        .unwrap();
    assert_eq!(
        titles,
        vec![
            Value::Text("c".into()),
            Value::Text("b".into()),
            Value::Text("a".into())
        ]
    );

    let max = QueryBuilder::table("problems").max(&db, "user_id").unwrap();
    assert_eq!(max, Value::Integer(2));
    let sum = QueryBuilder::table("problems").sum(&db, "user_id").unwrap();
    assert_eq!(sum, Value::Integer(4));
    let avg = QueryBuilder::table("problems").avg(&db, "user_id").unwrap();
    assert!(avg.as_f64().is_some());

    let title = QueryBuilder::table("problems")
        .where_eq("user_id", 2)
        .unwrap()
        .value(&db, "title")
        .unwrap();
    assert_eq!(title, Some(Value::Text("c".into())));
}

#[test]
fn builder_mutations_against_live_data() {
    let db = connection();

    let id = QueryBuilder::table("users")
        .insert_data(
            &db,
            &[("name", "Alice".into()), ("email", "a@example.com".into())],
        )
        .unwrap();
    assert_eq!(id, 1);

    let affected = QueryBuilder::table("users")
        .where_eq("id", id)
        .unwrap()
        .update_data(&db, &[("name", "Alicia".into())])
        .unwrap();
    assert_eq!(affected, 1);

    let row = QueryBuilder::table("users").find(&db, id).unwrap().unwrap();
    assert_eq!(row.try_get::<String>("name").unwrap(), "Alicia");

    let removed = QueryBuilder::table("users")
        .where_eq("id", id)
        .unwrap()
        .delete_data(&db)
        .unwrap();
    assert_eq!(removed, 1);
    assert!(QueryBuilder::table("users").doesnt_exist(&db).unwrap());
}

#[test]
fn in_random_order_still_returns_every_row() {
    let db = connection();
    for i in 0..5 {
        assert!(Problem::titled(&format!("p{i}")).save(&db).unwrap());
    }
    let rows = QueryBuilder::table("problems")
        .in_random_order()
        .unwrap()
        .get(&db)
        .unwrap();
    assert_eq!(rows.len(), 5);
}

// ==================== Uniqueness helper ====================

#[test]
fn unique_rejects_duplicate_values() {
    let db = connection();

    let mut alice = User::named("Alice", "taken@example.com");
    assert!(alice.save(&db).unwrap());

    let mut impostor = User::named("Impostor", "taken@example.com");
    assert!(!validations::unique(&db, &["email"], &mut impostor).unwrap());
    assert_eq!(
        impostor.errors().get("email"),
        Some("has already been taken")
    );

    // A persisted record does not collide with itself.
    assert!(validations::unique(&db, &["email"], &mut alice).unwrap());
}

#[test]
fn unique_over_multiple_fields_matches_the_pair() {
    let db = connection();

    let mut user = User::named("Alice", "alice@example.com");
    let mut problem = Problem::titled("p");
    assert!(user.save(&db).unwrap());
    assert!(problem.save(&db).unwrap());
    reinforce(&db, &user, &problem);

    let mut duplicate = ProblemUserReinforce {
        problem_id: problem.id(),
        user_id: user.id(),
        ..Default::default()
    };
    assert!(
        !validations::unique(&db, &["problem_id", "user_id"], &mut duplicate).unwrap()
    );

    let mut other = ProblemUserReinforce {
        problem_id: problem.id(),
        user_id: Some(777),
        ..Default::default()
    };
    assert!(validations::unique(&db, &["problem_id", "user_id"], &mut other).unwrap());
}
