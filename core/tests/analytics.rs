use customer360_core::analytics::{
    compute_kpis, compute_offer_distribution, compute_product_penetration,
    compute_segment_distribution, filter_by_segments,
};
use customer360_core::dataset::{CustomerRecord, Dataset};
use std::collections::BTreeSet;

// ── Helpers ──────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn record(
    id: u64,
    segment: &str,
    income: f64,
    balance: f64,
    products: u32,
    credit_card: bool,
    loan: bool,
    investments: bool,
    offer: &str,
) -> CustomerRecord {
    CustomerRecord {
        customer_id: id,
        age: 40,
        segment_name: segment.to_string(),
        income,
        avg_balance: balance,
        product_count: products,
        risk_score: 0.5,
        has_credit_card: credit_card,
        has_loan: loan,
        has_investments: investments,
        cross_sell_offer: offer.to_string(),
    }
}

fn sample_dataset() -> Dataset {
    Dataset::from_records(vec![
        record(1, "Premium", 90_000.0, 150_000.0, 4, true, false, true, "WealthAdvisory"),
        record(2, "Mass", 30_000.0, 4_000.0, 1, false, true, false, "PersonalLoan"),
        record(3, "Premium", 85_000.0, 120_000.0, 3, false, true, true, "WealthAdvisory"),
        record(4, "Student", 9_000.0, 700.0, 1, false, false, false, "CreditCardUpgrade"),
        record(5, "Mass", 35_000.0, 6_000.0, 2, true, true, false, "CreditCardUpgrade"),
    ])
}

fn selection(segments: &[&str]) -> BTreeSet<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Every filtered row's segment is in the selection, the subset is never
/// larger than the table, and original order is preserved.
#[test]
fn filtered_rows_all_within_selection() {
    let dataset = sample_dataset();
    let selected = selection(&["Premium", "Student"]);

    let rows = filter_by_segments(&dataset, &selected);

    assert!(rows.len() <= dataset.len());
    assert!(rows.iter().all(|r| selected.contains(&r.segment_name)));
    let ids: Vec<u64> = rows.iter().map(|r| r.customer_id).collect();
    assert_eq!(ids, vec![1, 3, 4], "Original row order must be preserved");
}

/// An empty selection is legal: it yields an empty subset, None KPIs, and
/// empty derived tables, never an error.
#[test]
fn empty_selection_degrades_gracefully() {
    let dataset = sample_dataset();
    let rows = filter_by_segments(&dataset, &BTreeSet::new());

    assert!(rows.is_empty());
    assert!(compute_kpis(&rows).is_none());
    assert!(compute_segment_distribution(&rows).is_empty());
    assert!(compute_product_penetration(&rows).is_empty());
    assert!(compute_offer_distribution(&rows).is_empty());
}

/// Display rounding: averages of income/balance truncate to whole
/// currency units; the product average rounds to two decimals.
#[test]
fn kpi_averages_follow_display_rounding() {
    let dataset = Dataset::from_records(vec![
        record(1, "Mass", 100.0, 10.9, 1, false, false, false, "A"),
        record(2, "Mass", 101.0, 10.9, 2, false, false, false, "A"),
        record(3, "Mass", 101.0, 10.9, 4, false, false, false, "A"),
    ]);
    let rows = filter_by_segments(&dataset, &selection(&["Mass"]));

    let kpis = compute_kpis(&rows).unwrap();
    assert_eq!(kpis.customers, 3);
    assert_eq!(kpis.avg_income, 100, "302/3 = 100.67 truncates to 100");
    assert_eq!(kpis.avg_balance, 10);
    assert_eq!(kpis.avg_product_count, 2.33, "7/3 rounds to 2.33");
}

/// Segment distribution counts each segment present in the subset and
/// omits the rest.
#[test]
fn segment_distribution_counts_and_omits() {
    let dataset = sample_dataset();
    let rows = filter_by_segments(&dataset, &selection(&["Premium", "Mass"]));

    let distribution = compute_segment_distribution(&rows);

    let as_pairs: Vec<(&str, u64)> = distribution
        .iter()
        .map(|e| (e.segment.as_str(), e.customers))
        .collect();
    assert_eq!(as_pairs, vec![("Mass", 2), ("Premium", 2)]);
}

/// Penetration percentages stay within [0, 100] and groups come back
/// sorted ascending by segment name.
#[test]
fn penetration_bounded_and_sorted() {
    let dataset = sample_dataset();
    let selected: BTreeSet<String> = dataset.segment_names().into_iter().collect();
    let rows = filter_by_segments(&dataset, &selected);

    let penetration = compute_product_penetration(&rows);

    let names: Vec<&str> = penetration.iter().map(|p| p.segment.as_str()).collect();
    assert_eq!(names, vec!["Mass", "Premium", "Student"]);

    for group in &penetration {
        for pct in [group.credit_card_pct, group.loan_pct, group.investments_pct] {
            assert!(
                (0.0..=100.0).contains(&pct),
                "Penetration out of bounds for {}: {pct}",
                group.segment
            );
        }
    }
}

/// Penetration arithmetic: 1 of 2 Premium customers holds a credit card,
/// both hold investments, and the Student group sits at zero across the
/// board.
#[test]
fn penetration_percentages_exact() {
    let dataset = sample_dataset();
    let selected: BTreeSet<String> = dataset.segment_names().into_iter().collect();
    let rows = filter_by_segments(&dataset, &selected);

    let penetration = compute_product_penetration(&rows);

    let premium = penetration.iter().find(|p| p.segment == "Premium").unwrap();
    assert_eq!(premium.customers, 2);
    assert!((premium.credit_card_pct - 50.0).abs() < 1e-9);
    assert!((premium.investments_pct - 100.0).abs() < 1e-9);

    let student = penetration.iter().find(|p| p.segment == "Student").unwrap();
    assert_eq!(student.credit_card_pct, 0.0);
    assert_eq!(student.loan_pct, 0.0);
    assert_eq!(student.investments_pct, 0.0);
}

/// Per-offer counts sum to the filtered row count: no row is dropped or
/// double-counted.
#[test]
fn offer_counts_sum_to_filtered_total() {
    let dataset = sample_dataset();
    let rows = filter_by_segments(&dataset, &selection(&["Premium", "Mass", "Student"]));

    let mix = compute_offer_distribution(&rows);
    let total: u64 = mix.iter().map(|o| o.customers).sum();
    assert_eq!(total as usize, rows.len());
}

/// Offer mix is sorted descending by count; equal counts break ties
/// ascending by offer label.
#[test]
fn offer_mix_sort_order_with_tiebreak() {
    let dataset = Dataset::from_records(vec![
        record(1, "Mass", 1.0, 1.0, 1, false, false, false, "CardUpgrade"),
        record(2, "Mass", 1.0, 1.0, 1, false, false, false, "AutoLoan"),
        record(3, "Mass", 1.0, 1.0, 1, false, false, false, "Deposit"),
        record(4, "Mass", 1.0, 1.0, 1, false, false, false, "Deposit"),
        record(5, "Mass", 1.0, 1.0, 1, false, false, false, "Deposit"),
        record(6, "Mass", 1.0, 1.0, 1, false, false, false, "CardUpgrade"),
    ]);
    let rows = filter_by_segments(&dataset, &selection(&["Mass"]));

    let mix = compute_offer_distribution(&rows);
    let as_pairs: Vec<(&str, u64)> = mix.iter().map(|o| (o.offer.as_str(), o.customers)).collect();
    assert_eq!(
        as_pairs,
        vec![("Deposit", 3), ("AutoLoan", 2), ("CardUpgrade", 2)],
        "Descending by count, ascending by label on ties"
    );
}

/// The reference scenario: filtering to Premium yields 2 rows and a
/// single-entry offer distribution.
#[test]
fn premium_filter_scenario() {
    let dataset = Dataset::from_records(vec![
        record(1, "Premium", 1.0, 1.0, 1, false, false, false, "CreditCardUpgrade"),
        record(2, "Mass", 1.0, 1.0, 1, false, false, false, "PersonalLoan"),
        record(3, "Premium", 1.0, 1.0, 1, false, false, false, "CreditCardUpgrade"),
    ]);

    let rows = filter_by_segments(&dataset, &selection(&["Premium"]));
    assert_eq!(rows.len(), 2);

    let mix = compute_offer_distribution(&rows);
    assert_eq!(mix.len(), 1);
    assert_eq!(mix[0].offer, "CreditCardUpgrade");
    assert_eq!(mix[0].customers, 2);
}

/// All aggregation operations are pure: calling twice with identical
/// inputs yields identical output.
#[test]
fn aggregation_is_idempotent() {
    let dataset = sample_dataset();
    let selected = selection(&["Premium", "Mass"]);
    let rows = filter_by_segments(&dataset, &selected);

    assert_eq!(compute_kpis(&rows), compute_kpis(&rows));
    assert_eq!(
        compute_segment_distribution(&rows),
        compute_segment_distribution(&rows)
    );
    assert_eq!(
        compute_product_penetration(&rows),
        compute_product_penetration(&rows)
    );
    assert_eq!(
        compute_offer_distribution(&rows),
        compute_offer_distribution(&rows)
    );
}
