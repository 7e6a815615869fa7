use super::*;
use crate::model::record::RawRecord;
use crate::pipeline::stage2_derive::derive_record;
use crate::pipeline::stage4_aggregate::aggregate_by_company;

fn record(
    study: &str,
    company: &str,
    total: u64,
    approved_pct: f64,
    completeness: f64,
) -> StudyRecord {
    derive_record(RawRecord {
        study_code: Some(study.to_string()),
        company_code: Some(company.to_string()),
        file_ref: format!("ELN-{study}"),
        total_batches: total,
        approved_pct,
        completeness_pct: completeness,
        ..RawRecord::default()
    })
}

fn rows() -> Vec<StudyRecord> {
    vec![
        record("001.001.24", "010_ACME", 20, 95.0, 88.0),
        record("002.001.23", "020_BETA", 10, 50.0, 40.0),
        record("003.001.24", "010_ACME", 8, 75.0, 97.0),
        record("004.001.24", "020_BETA", 0, 0.0, 0.0),
    ]
}

fn studies(rows: &[StudyRecord]) -> Vec<&str> {
    rows.iter().filter_map(StudyRecord::study).collect()
}

#[test]
fn test_selection_parse_all_spellings() {
    assert_eq!(Selection::parse(None), Selection::All);
    assert_eq!(Selection::parse(Some("")), Selection::All);
    assert_eq!(Selection::parse(Some("All")), Selection::All);
    assert_eq!(Selection::parse(Some("Todas")), Selection::All);
    assert_eq!(
        Selection::parse(Some(" ACME ")),
        Selection::Only("ACME".to_string())
    );
}

#[test]
fn test_default_state_keeps_everything() {
    let rows = rows();
    assert!(FilterState::default().predicates().is_empty());
    assert_eq!(apply_filters(&rows, &FilterState::default()), rows);
}

#[test]
fn test_company_filter() {
    let state = FilterState {
        company: Selection::Only("ACME".to_string()),
        ..FilterState::default()
    };
    let out = apply_filters(&rows(), &state);
    assert_eq!(studies(&out), ["001.001.24", "003.001.24"]);
}

#[test]
fn test_year_and_study_filters() {
    let state = FilterState {
        year: Selection::Only("2023".to_string()),
        ..FilterState::default()
    };
    assert_eq!(studies(&apply_filters(&rows(), &state)), ["002.001.23"]);

    let state = FilterState {
        study: Selection::Only("003.001.24".to_string()),
        ..FilterState::default()
    };
    assert_eq!(studies(&apply_filters(&rows(), &state)), ["003.001.24"]);
}

#[test]
fn test_min_completeness_is_inclusive() {
    let state = FilterState {
        min_completeness: 97.0,
        ..FilterState::default()
    };
    assert_eq!(studies(&apply_filters(&rows(), &state)), ["003.001.24"]);

    let state = FilterState {
        min_completeness: 95.0,
        ..FilterState::default()
    };
    assert_eq!(studies(&apply_filters(&rows(), &state)), ["003.001.24"]);
}

#[test]
fn test_rows_without_company_never_match_company_filter() {
    let mut orphan = record("005.001.24", "010_ACME", 5, 90.0, 90.0);
    orphan.company_name = None;
    let state = FilterState {
        company: Selection::Only("ACME".to_string()),
        ..FilterState::default()
    };
    assert!(apply_filters(&[orphan], &state).is_empty());
}

#[test]
fn test_predicate_order_does_not_matter() {
    let rows = rows();
    let mut predicates = vec![
        Predicate::Company("BETA".to_string()),
        Predicate::MinCompleteness(30.0),
        Predicate::CriticalOnly,
    ];
    let forward = apply_predicates(&rows, &predicates);
    assert_eq!(studies(&forward), ["002.001.23"]);
    predicates.reverse();
    let backward = apply_predicates(&rows, &predicates);
    assert_eq!(forward, backward);

    let step = apply_predicates(&apply_predicates(&rows, &predicates[..1]), &predicates[1..]);
    assert_eq!(step, forward);
}

#[test]
fn test_critical_classification() {
    let out = classify_critical(&rows());
    // BETA (50/40) and the empty BETA row (0/0); ACME rows pass both limits.
    assert_eq!(studies(&out), ["002.001.23", "004.001.24"]);
    for r in &out {
        assert!(r.raw.approved_pct < 70.0 || r.raw.completeness_pct < 80.0);
    }

    let state = FilterState {
        critical_only: true,
        ..FilterState::default()
    };
    assert_eq!(apply_filters(&rows(), &state), out);
}

#[test]
fn test_critical_boundaries_are_strict() {
    let at_limit = record("006.001.24", "010_ACME", 3, 70.0, 80.0);
    assert!(classify_critical(&[at_limit]).is_empty());
    let below = record("007.001.24", "010_ACME", 3, 69.99, 80.0);
    assert_eq!(classify_critical(&[below]).len(), 1);
}

#[test]
fn test_full_view_drops_empty_and_sorts_by_completeness() {
    let out = full_view(&rows());
    assert_eq!(studies(&out), ["003.001.24", "001.001.24", "002.001.23"]);
}

#[test]
fn test_critical_view_sorted_and_capped() {
    let mut many: Vec<StudyRecord> = (0..25)
        .map(|i| record(&format!("{i:03}.001.24"), "020_BETA", 4, 60.0 - i as f64, 50.0))
        .collect();
    many.push(record("999.001.24", "020_BETA", 0, 1.0, 1.0));
    let out = critical_view(&many);
    assert_eq!(out.len(), CRITICAL_VIEW_LIMIT);
    assert!(out.iter().all(StudyRecord::has_batches));
    assert!(
        out.windows(2)
            .all(|w| w[0].raw.approved_pct <= w[1].raw.approved_pct)
    );
    assert_eq!(out[0].raw.approved_pct, 36.0);
}

#[test]
fn test_filter_options() {
    let rows = rows();
    let all = filter_options(&rows, &Selection::All);
    assert_eq!(all.companies, ["ACME", "BETA"]);
    assert_eq!(all.years, ["2024", "2023"]);
    assert_eq!(all.studies.len(), 4);

    let acme = filter_options(&rows, &Selection::Only("ACME".to_string()));
    assert_eq!(acme.studies, ["001.001.24", "003.001.24"]);
    assert_eq!(acme.companies, all.companies);
}

#[test]
fn test_two_company_threshold_walkthrough() {
    let mut acme = record("001.001.24", "010_ACME", 100, 95.0, 92.0);
    acme.raw.approved = 95;
    let mut beta = record("002.001.23", "020_BETA", 50, 40.0, 60.0);
    beta.raw.approved = 20;
    let rows = vec![acme, beta];

    let options = filter_options(&rows, &Selection::All);
    assert_eq!(options.years, ["2024", "2023"]);

    let critical = apply_filters(
        &rows,
        &FilterState {
            critical_only: true,
            ..FilterState::default()
        },
    );
    assert_eq!(studies(&critical), ["002.001.23"]);

    // ACME sits below 95 completeness whether or not the critical toggle is on.
    for critical_only in [false, true] {
        let out = apply_filters(
            &rows,
            &FilterState {
                min_completeness: 95.0,
                critical_only,
                ..FilterState::default()
            },
        );
        assert!(out.iter().all(|r| r.company() != Some("ACME")));
        assert!(out.is_empty());
    }

    let agg = aggregate_by_company(&rows);
    let acme = agg.iter().find(|a| a.company == "ACME").unwrap();
    assert_eq!(acme.approval_rate, 95.0);
    assert_eq!(agg[0].company, "BETA");
    assert_eq!(agg[0].approval_rate, 40.0);
}
