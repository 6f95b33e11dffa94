use std::cell::RefCell;

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::locale::Locale;
use crate::model::{DescriptorSet, FieldDescriptor, FieldType, RecordSnapshot};
use crate::normalize::{normalize, NormalizeOptions};
use crate::present::{HtmlPresenter, ReviewPresenter, ReviewRow};
use crate::review::{ReviewError, ReviewSession, ReviewState, Submission};

#[derive(Default)]
struct NullPresenter {
    presented: usize,
    closed: bool,
}

impl ReviewPresenter for NullPresenter {
    fn present(&mut self, rows: &[ReviewRow]) {
        self.presented = rows.len();
    }

    fn focus_reason(&mut self, _index: usize) {}

    fn update_reasons(&mut self, _rows: &[ReviewRow]) {}

    fn mark_invalid(&mut self, _rows: &[ReviewRow]) {}

    fn close(&mut self) {
        self.closed = true;
    }
}

fn single(key: &str, old: serde_json::Value, new: serde_json::Value) -> usize {
    let original = RecordSnapshot::new().with(key, old);
    let edited = RecordSnapshot::new().with(key, new);
    crate::diff(&original, &edited, &DescriptorSet::new()).len()
}

#[test]
fn equivalent_representations_are_not_changes() {
    let options = NormalizeOptions::default();
    let groups = [
        vec![json!("1"), json!(true), json!(1), json!("true")],
        vec![json!("0"), json!(false), json!(0), json!("false")],
        vec![json!(null), json!(""), json!("None"), json!("NA"), json!("(empty)")],
        vec![json!("1/2/2024"), json!("01/02/2024"), json!("2024-02-01"), json!("01/02/2024 09:15")],
    ];
    for group in groups.iter() {
        for a in group {
            for b in group {
                assert_eq!(normalize(a, &options), normalize(b, &options));
                assert_eq!(single("f", a.clone(), b.clone()), 0, "{a} vs {b}");
            }
        }
    }
}

#[test]
fn same_date_in_two_formats_is_unchanged() {
    assert_eq!(single("d", json!("01/02/2024"), json!("2024-02-01")), 0);
}

#[test]
fn boolean_equivalence_and_real_change() {
    assert_eq!(single("a", json!("1"), json!("true")), 0);

    let original = RecordSnapshot::new().with("a", "0");
    let edited = RecordSnapshot::new().with("a", "1");
    let changes = crate::diff(&original, &edited, &DescriptorSet::new());
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].old_normalized, "0");
    assert_eq!(changes[0].new_normalized, "1");
}

#[test]
fn blank_rows_are_named_exactly() {
    let original = RecordSnapshot::new().with("a", "1").with("b", "1").with("c", "1");
    let edited = RecordSnapshot::new().with("a", "2").with("b", "2").with("c", "2");
    let changes = crate::diff(&original, &edited, &DescriptorSet::new());

    let mut session = ReviewSession::new(NullPresenter::default(), Locale::En);
    session.open(changes, |_| {}).unwrap();
    session.set_reason("b", "checked against CRF").unwrap();
    match session.submit() {
        Err(ReviewError::Validation(err)) => {
            assert_eq!(err.invalid_keys, vec!["a".to_string(), "c".to_string()])
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(session.rows()[1].reason, "checked against CRF");
    assert!(!session.rows()[1].invalid);
    assert!(!session.presenter().closed);
}

#[test]
fn common_reason_blank_is_noop_and_text_fills_all() {
    let original = RecordSnapshot::new().with("a", "1").with("b", "1");
    let edited = RecordSnapshot::new().with("a", "2").with("b", "2");
    let changes = crate::diff(&original, &edited, &DescriptorSet::new());

    let mut session = ReviewSession::new(NullPresenter::default(), Locale::En);
    session.open(changes, |_| {}).unwrap();
    session.set_reason("a", "first").unwrap();

    session.apply_common_reason("").unwrap();
    let reasons: Vec<String> = session.rows().iter().map(|r| r.reason.clone()).collect();
    assert_eq!(reasons, vec!["first".to_string(), String::new()]);

    session.apply_common_reason("ok").unwrap();
    let reasons: Vec<String> = session.rows().iter().map(|r| r.reason.clone()).collect();
    assert_eq!(reasons, vec!["ok".to_string(), "ok".to_string()]);
}

#[test]
fn status_change_end_to_end() {
    let descriptors: DescriptorSet = vec![
        FieldDescriptor::new("status", "Status", FieldType::Checkbox),
        FieldDescriptor::new("visitDate", "Visit date", FieldType::Date),
    ]
    .into_iter()
    .collect();
    let original = RecordSnapshot::new()
        .with("status", "0")
        .with("visitDate", "01/01/2024");
    let edited = RecordSnapshot::new()
        .with("status", "1")
        .with("visitDate", "01/01/2024");

    let changes = crate::diff(&original, &edited, &descriptors);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].key, "status");
    assert_eq!(changes[0].old_normalized, "0");
    assert_eq!(changes[0].new_normalized, "1");

    let received: RefCell<Vec<Submission>> = RefCell::new(Vec::new());
    let mut session = ReviewSession::new(NullPresenter::default(), Locale::En);
    session
        .open(changes, |s| received.borrow_mut().push(s.clone()))
        .unwrap();
    assert_eq!(session.presenter().presented, 1);
    session.set_reason("status", "corrected").unwrap();
    let submission = session.submit().unwrap();

    assert_eq!(session.state(), ReviewState::Completed);
    assert!(session.presenter().closed);
    assert_eq!(submission.reason_map.len(), 1);
    assert_eq!(submission.reason_map.get("status"), Some("corrected"));
    assert_eq!(submission.human_readable_summary, "Status: corrected");
    assert_eq!(session.submission(), Some(&submission));
    assert_eq!(received.borrow().as_slice(), &[submission]);
}

#[test]
fn reason_map_matches_changed_set_exactly() {
    let original = RecordSnapshot::new()
        .with("a", "x")
        .with("b", "same")
        .with("c", "x");
    let edited = RecordSnapshot::new()
        .with("a", "y")
        .with("b", "same")
        .with("c", "y")
        .with("d", "new");
    let changes = crate::diff(&original, &edited, &DescriptorSet::new());
    let keys: Vec<String> = changes.iter().map(|c| c.key.clone()).collect();

    let mut session = ReviewSession::new(NullPresenter::default(), Locale::En);
    session.open(changes, |_| {}).unwrap();
    session.apply_common_reason("audit").unwrap();
    let submission = session.submit().unwrap();
    let reason_keys: Vec<String> = submission
        .reason_map
        .keys()
        .map(str::to_string)
        .collect();
    assert_eq!(reason_keys, keys);
}

#[test]
fn html_presenter_drives_a_spanish_review() {
    let descriptors: DescriptorSet = vec![FieldDescriptor::new("site", "Centro", FieldType::Select)
        .with_option("1", "Madrid")
        .with_option("2", "Lima")]
    .into_iter()
    .collect();
    let original = RecordSnapshot::new().with("site", 1);
    let edited = RecordSnapshot::new().with("site", "2");
    let changes = crate::diff(&original, &edited, &descriptors);

    let mut presenter = HtmlPresenter::new(Locale::Es);
    {
        let mut session = ReviewSession::new(&mut presenter, Locale::Es);
        session.open(changes, |_| {}).unwrap();
        let err = session.submit().unwrap_err();
        assert!(matches!(err, ReviewError::Validation(_)));
        assert_eq!(session.state(), ReviewState::Reviewing);
    }
    let html = presenter.render();
    assert!(html.contains("<td>Madrid</td>"));
    assert!(html.contains("<td>Lima</td>"));
    assert!(html.contains("class=\"is-invalid\""));
    assert!(html.contains("Confirmar cambios"));
}

#[test]
fn common_reason_is_rendered_into_every_input() {
    let original = RecordSnapshot::new().with("a", "1").with("b", "1");
    let edited = RecordSnapshot::new().with("a", "2").with("b", "2");
    let changes = crate::diff(&original, &edited, &DescriptorSet::new());

    let mut presenter = HtmlPresenter::new(Locale::En);
    {
        let mut session = ReviewSession::new(&mut presenter, Locale::En);
        session.open(changes, |_| {}).unwrap();
        session.apply_common_reason("audit").unwrap();
        session.set_reason("b", "double entry").unwrap();
    }
    let html = presenter.render();
    assert!(html.contains(r#"name="reason[a]" value="audit" required autofocus/>"#));
    assert!(html.contains(r#"name="reason[b]" value="double entry" required/>"#));
}
