//! Property-based tests for Playrecap
//!
//! Uses proptest to check recap aggregation and rendering over generated
//! runs: footers add up, rows add up, order is stable and rendering is
//! repeatable.

use proptest::prelude::*;

use playrecap::callback::{
    HostStats, MissingCountPolicy, RecapLayout, RecapOptions, RecapRenderer, RecapTotals,
    RunStats, RunStatsDocument, StatusKind, Theme,
};

// ============================================================================
// Strategies
// ============================================================================

fn arb_host_stats() -> impl Strategy<Value = HostStats> {
    prop::array::uniform7(0u64..1000).prop_map(|counts| {
        StatusKind::ALL
            .iter()
            .zip(counts)
            .fold(HostStats::new(), |stats, (kind, count)| stats.with(*kind, count))
    })
}

fn arb_run_stats() -> impl Strategy<Value = RunStats> {
    prop::collection::btree_map("[a-z][a-z0-9]{0,11}", arb_host_stats(), 0..12).prop_map(
        |hosts| {
            hosts
                .into_iter()
                .fold(RunStats::new(), |stats, (host, counters)| {
                    stats.with_host(host, counters)
                })
        },
    )
}

fn arb_layout() -> impl Strategy<Value = RecapLayout> {
    prop_oneof![Just(RecapLayout::Table), Just(RecapLayout::Inline)]
}

fn plain(layout: RecapLayout) -> RecapRenderer {
    RecapRenderer::new(
        Theme::default(),
        RecapOptions {
            layout,
            use_color: false,
            ..RecapOptions::default()
        },
    )
}

/// Parse a plain log line back into `(host, counts, total)`.
fn parse_log_line(line: &str) -> (String, Vec<u64>, u64) {
    let (host, rest) = line.split_once(" : ").unwrap();
    let mut values: Vec<u64> = rest
        .split_whitespace()
        .map(|cell| cell.split_once('=').unwrap().1.parse().unwrap())
        .collect();
    let total = values.pop().unwrap();
    (host.trim_end().to_string(), values, total)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn footer_equals_column_sums(stats in arb_run_stats()) {
        let totals = RecapTotals::from_stats(&stats);
        for kind in StatusKind::ALL {
            let sum: u64 = stats.hosts().map(|(_, host)| host.get(kind)).sum();
            prop_assert_eq!(totals.get(kind), sum);
        }
        let grand: u64 = stats.hosts().map(|(_, host)| host.total()).sum();
        prop_assert_eq!(totals.grand_total(), grand);
    }

    #[test]
    fn log_rows_add_up(stats in arb_run_stats()) {
        let output = plain(RecapLayout::Table).render(&stats, false);
        // Banner first, then one row per host, then the footer.
        prop_assert_eq!(output.log.len(), stats.len() + 2);

        let mut column_sums = [0u64; 7];
        for line in &output.log[1..output.log.len() - 1] {
            let (host, counts, total) = parse_log_line(&line.text);
            prop_assert_eq!(counts.len(), 7);
            prop_assert_eq!(counts.iter().sum::<u64>(), total);
            prop_assert_eq!(stats.host(&host).map(|h| h.total()), Some(total));
            for (sum, count) in column_sums.iter_mut().zip(&counts) {
                *sum += count;
            }
        }

        let (label, footer, grand) = parse_log_line(&output.log[output.log.len() - 1].text);
        prop_assert_eq!(label, "Total");
        prop_assert_eq!(footer, column_sums.to_vec());
        prop_assert_eq!(grand, column_sums.iter().sum::<u64>());
    }

    #[test]
    fn hosts_are_rendered_sorted(stats in arb_run_stats(), layout in arb_layout()) {
        let output = plain(layout).render(&stats, false);
        let hosts: Vec<String> = output.log[1..output.log.len() - 1]
            .iter()
            .map(|line| parse_log_line(&line.text).0)
            .collect();
        let mut sorted = hosts.clone();
        sorted.sort();
        prop_assert_eq!(hosts, sorted);
    }

    #[test]
    fn rendering_is_idempotent(stats in arb_run_stats(), layout in arb_layout(), dry in any::<bool>()) {
        let renderer = plain(layout);
        prop_assert_eq!(renderer.render(&stats, dry), renderer.render(&stats, dry));
    }

    #[test]
    fn insertion_order_does_not_matter(stats in arb_run_stats()) {
        let reversed = stats
            .hosts()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .fold(RunStats::new(), |acc, (host, counters)| acc.with_host(host, *counters));

        let renderer = plain(RecapLayout::Table);
        prop_assert_eq!(renderer.render(&stats, false), renderer.render(&reversed, false));
    }

    #[test]
    fn document_conversion_preserves_counts(stats in arb_run_stats()) {
        let doc = RunStatsDocument::from(&stats);
        let back = doc.into_run_stats(MissingCountPolicy::Reject).unwrap();
        prop_assert_eq!(back, stats);
    }
}
