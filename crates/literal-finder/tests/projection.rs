//! Written literals come back as the records they were written from.

use literal_finder::{to_records, Finder, LiteralRecord, ResultSet, ScalarValue};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Job {
    name: String,
    retries: i64,
    enabled: bool,
}

fn job() -> impl Strategy<Value = Job> {
    ("[a-z][a-z0-9_ -]{0,12}", 0..=i64::MAX, any::<bool>()).prop_map(
        |(name, retries, enabled)| Job {
            name,
            retries,
            enabled,
        },
    )
}

fn render(value: &ScalarValue) -> String {
    match value {
        ScalarValue::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}

fn write_source(records: &ResultSet) -> String {
    let mut code = String::from(
        "pub struct Job { pub name: &'static str, pub retries: i64, pub enabled: bool }\n",
    );
    code.push_str("pub const JOBS: &[Job] = &[\n");
    for record in records {
        let fields: Vec<String> = record
            .iter()
            .map(|(field, value)| format!("{field}: {}", render(value)))
            .collect();
        code.push_str(&format!("    Job {{ {} }},\n", fields.join(", ")));
    }
    code.push_str("];\n");
    code
}

fn find(code: String) -> Vec<LiteralRecord> {
    let mut finder = Finder::new("crate::Job").unwrap();
    finder.add("src/lib.rs", code).unwrap();
    finder.find().unwrap().into_records()
}

proptest! {
    #[test]
    fn prop_records_survive_source(jobs in prop::collection::vec(job(), 0..8)) {
        let records = to_records(&jobs).unwrap();
        let found = find(write_source(&records));
        prop_assert_eq!(found, records.into_records());
    }

    #[test]
    fn prop_typed_values_survive_source(jobs in prop::collection::vec(job(), 0..8)) {
        let records = to_records(&jobs).unwrap();
        let mut finder = Finder::new("crate::Job").unwrap();
        finder.add("src/lib.rs", write_source(&records)).unwrap();
        let decoded: Vec<Job> = finder.find_into().unwrap();
        prop_assert_eq!(decoded, jobs);
    }
}

#[test]
fn floats_survive_source() {
    let records = ResultSet::new(vec![
        LiteralRecord::new().with("x", 0.5),
        LiteralRecord::new().with("x", 1e21),
        LiteralRecord::new().with("x", 3.0),
    ]);
    let code = write_source(&records).replace(
        "pub struct Job { pub name: &'static str, pub retries: i64, pub enabled: bool }",
        "pub struct Job { pub x: f64 }",
    );
    assert_eq!(find(code), records.into_records());
}
