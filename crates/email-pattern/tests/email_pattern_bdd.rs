//! Behavioural tests for the email-pattern crate.
//!
//! These scenarios cover inference, table-driven and direct synthesis,
//! row-scoped failures, and rejected input tables.

// `expect` is idiomatic in test code for failing fast on precondition violations.
#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use email_pattern::{
    BatchError, Convention, ConventionError, DirectRecord, DirectSynthesizedRecord, Inference,
    NameComponent, ProspectRecord, RecordError, SampleRecord, SynthesizedRecord, TableError,
    infer, read_records, synthesize, synthesize_direct,
};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};

/// Test world holding input rows and engine results.
#[derive(Default, ScenarioState)]
struct World {
    samples: Slot<Vec<SampleRecord>>,
    prospects: Slot<Vec<ProspectRecord>>,
    direct_rows: Slot<Vec<DirectRecord>>,
    table_text: Slot<String>,
    read_result: Slot<Result<Vec<SampleRecord>, TableError>>,
    inference: Slot<Inference>,
    predictions: Slot<Vec<SynthesizedRecord>>,
    generated: Slot<Vec<DirectSynthesizedRecord>>,
}

impl World {
    fn push_prospect(&self, prospect: ProspectRecord) {
        let mut prospects = self.prospects.get().unwrap_or_default();
        prospects.push(prospect);
        self.prospects.set(prospects);
    }

    fn predictions(&self) -> Vec<SynthesizedRecord> {
        self.predictions.get().expect("predictions should be set")
    }
}

#[fixture]
fn world() -> World {
    World::default()
}

fn email_of(record: &SynthesizedRecord) -> Option<String> {
    record.outcome.as_ref().ok().map(|s| s.email.clone())
}

// ============================================================================
// Given steps
// ============================================================================

#[given("a sample \"{first}\" \"{last}\" with email \"{email}\"")]
fn a_sample(world: &World, first: String, last: String, email: String) {
    let mut samples = world.samples.get().unwrap_or_default();
    samples.push(SampleRecord {
        first_name: first,
        last_name: last,
        email,
    });
    world.samples.set(samples);
}

#[given("a prospect \"{first}\" \"{last}\" at \"{url}\"")]
fn a_prospect(world: &World, first: String, last: String, url: String) {
    world.push_prospect(ProspectRecord {
        first_name: first,
        last_name: last,
        url,
    });
}

#[given("a prospect \"{first}\" with no last name at \"{url}\"")]
fn a_prospect_without_last_name(world: &World, first: String, url: String) {
    world.push_prospect(ProspectRecord {
        first_name: first,
        last_name: String::new(),
        url,
    });
}

#[given("a direct row \"{first}\" \"{last}\" with format \"{format}\" at \"{domain}\"")]
fn a_direct_row(world: &World, first: String, last: String, format: String, domain: String) {
    let mut rows = world.direct_rows.get().unwrap_or_default();
    rows.push(DirectRecord {
        first_name: first,
        last_name: last,
        email_format: format,
        domain,
    });
    world.direct_rows.set(rows);
}

#[given("an inference table without an Email column")]
fn an_inference_table_without_email(world: &World) {
    world
        .table_text
        .set("First Name,Last Name\nJane,Doe\n".to_owned());
}

// ============================================================================
// When steps
// ============================================================================

#[when("conventions are inferred")]
fn conventions_are_inferred(world: &World) {
    let samples = world.samples.get().unwrap_or_default();
    world.inference.set(infer(&samples));
}

#[when("emails are predicted from the table")]
fn emails_are_predicted(world: &World) {
    let inference = world.inference.get().expect("inference should run first");
    let prospects = world.prospects.get().unwrap_or_default();
    world
        .predictions
        .set(synthesize(&prospects, &inference.store));
}

#[when("emails are generated directly")]
fn emails_are_generated_directly(world: &World) {
    let rows = world.direct_rows.get().unwrap_or_default();
    world.generated.set(synthesize_direct(&rows));
}

#[when("the inference table is read")]
fn the_inference_table_is_read(world: &World) {
    let text = world.table_text.get().expect("table text should be set");
    let result = read_records::<SampleRecord, _>(text.as_bytes());
    if let Ok(samples) = &result {
        world.inference.set(infer(samples));
    }
    world.read_result.set(result);
}

// ============================================================================
// Then steps
// ============================================================================

#[then("domain \"{domain}\" uses \"{label}\"")]
fn domain_uses(world: &World, domain: String, label: String) {
    let inference = world.inference.get().expect("inference should be set");
    let expected: Convention = label.parse().expect("known label");
    assert_eq!(inference.store.get(&domain), Some(expected));
}

#[then("the last predicted email is \"{email}\"")]
fn the_last_predicted_email_is(world: &World, email: String) {
    let predictions = world.predictions();
    assert_eq!(predictions.last().and_then(email_of), Some(email));
}

#[then("the first prospect fails with an empty last name")]
fn the_first_prospect_fails(world: &World) {
    let predictions = world.predictions();
    let outcome = predictions.first().map(|r| r.outcome.clone());
    assert_eq!(
        outcome,
        Some(Err(RecordError::Construct(
            ConventionError::EmptyNameComponent {
                convention: Convention::FirstNameFirstLetterLastName,
                component: NameComponent::Last,
            }
        )))
    );
}

#[then("the generated email is \"{email}\"")]
fn the_generated_email_is(world: &World, email: String) {
    let generated = world.generated.get().expect("direct results should be set");
    let actual = generated
        .first()
        .and_then(|r| r.outcome.as_ref().ok())
        .map(|s| s.email.clone());
    assert_eq!(actual, Some(email));
}

#[then("the input is rejected for missing column \"{column}\"")]
fn the_input_is_rejected(world: &World, column: String) {
    let result = world.read_result.get().expect("read result should be set");
    assert_eq!(
        result,
        Err(TableError::Rejected(BatchError::RejectedInput {
            missing: vec![column],
        }))
    );
}

#[then("no convention table is produced")]
fn no_convention_table_is_produced(world: &World) {
    assert!(world.inference.get().is_none());
}

// ============================================================================
// Scenario bindings
// ============================================================================

#[scenario(path = "tests/features/email_pattern.feature", index = 0)]
fn inference_detects_dotted_convention(world: World) {
    drop(world);
}

#[scenario(path = "tests/features/email_pattern.feature", index = 1)]
fn table_driven_synthesis_applies_inferred_convention(world: World) {
    drop(world);
}

#[scenario(path = "tests/features/email_pattern.feature", index = 2)]
fn unknown_domains_fall_back_to_default(world: World) {
    drop(world);
}

#[scenario(path = "tests/features/email_pattern.feature", index = 3)]
fn direct_mode_uses_stated_label(world: World) {
    drop(world);
}

#[scenario(path = "tests/features/email_pattern.feature", index = 4)]
fn empty_last_name_fails_only_its_row(world: World) {
    drop(world);
}

#[scenario(path = "tests/features/email_pattern.feature", index = 5)]
fn inference_input_without_email_is_rejected(world: World) {
    drop(world);
}
