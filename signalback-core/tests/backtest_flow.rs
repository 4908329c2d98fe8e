//! End-to-end core test: free-text recommendations through the
//! interpreter, simulator, and evaluator.

use chrono::{NaiveDate, Utc};

use signalback_core::data::{DailyClose, PriceSeries};
use signalback_core::domain::{Action, OracleConfigSnapshot, Signal};
use signalback_core::interpret::interpret;
use signalback_core::sim::{evaluate, EvalConfig, SizingConfig};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

fn signal_from_text(d: u32, text: &str) -> Signal {
    Signal {
        date: date(d),
        ticker: "QQQ".to_string(),
        decision_text: text.to_string(),
        decision: interpret(text),
        analysis_timestamp: Utc::now(),
        config: OracleConfigSnapshot::default(),
    }
}

fn series(closes: &[(u32, f64)]) -> PriceSeries {
    PriceSeries::new(
        "QQQ",
        closes
            .iter()
            .map(|(d, close)| DailyClose {
                date: date(*d),
                close: *close,
            })
            .collect(),
    )
}

#[test]
fn recommendation_texts_drive_the_full_comparison() {
    let series = series(&[(6, 300.0), (7, 310.0), (13, 315.0), (20, 320.0)]);
    let signals = vec![
        signal_from_text(7, "Strong Buy signal, high confidence"),
        signal_from_text(13, "Hold, no clear signal"),
        signal_from_text(20, "moderate sell into strength"),
    ];
    let config = EvalConfig {
        start_date: date(6),
        end_date: date(20),
        initial_capital: 100_000.0,
        sizing: SizingConfig::default(),
    };

    let results = evaluate(&signals, &series, &config).unwrap();

    // Buy on the 7th, nothing on the 13th, partial sell on the 20th.
    assert_eq!(results.transactions.len(), 2);
    assert_eq!(results.transactions[0].action, Action::Buy);
    assert_eq!(results.transactions[1].action, Action::Sell);
    assert_eq!(results.portfolio_history.len(), 3);

    // "moderate" scales the sell to 0.5 * 0.6 = 30% of holdings.
    let bought = results.transactions[0].shares;
    let sold = results.transactions[1].shares;
    assert!((sold - bought * 0.30).abs() < 1e-9);

    // Snapshot identity: value == cash + shares * price at every row.
    for snapshot in &results.portfolio_history {
        let identity = snapshot.cash + snapshot.shares * snapshot.price;
        assert!((snapshot.agent_value - identity).abs() < 1e-9);
    }

    // Benchmark fidelity: fixed share count opened at 300.
    let benchmark_shares = 100_000.0 / 300.0;
    for snapshot in &results.portfolio_history {
        assert!((snapshot.benchmark_value - benchmark_shares * snapshot.price).abs() < 1e-9);
    }
}

#[test]
fn all_hold_run_matches_initial_capital_in_cash() {
    let series = series(&[(6, 300.0), (7, 310.0), (20, 320.0)]);
    let signals = vec![
        signal_from_text(7, "wait and see"),
        signal_from_text(20, "no action recommended"),
    ];
    let config = EvalConfig {
        start_date: date(6),
        end_date: date(20),
        initial_capital: 100_000.0,
        sizing: SizingConfig::default(),
    };

    let results = evaluate(&signals, &series, &config).unwrap();
    assert!(results.transactions.is_empty());
    assert_eq!(results.final_portfolio.cash, 100_000.0);
    assert_eq!(results.final_portfolio.shares, 0.0);
    assert_eq!(results.final_values.agent, 100_000.0);
    assert!(results.returns.agent == 0.0);
    // Benchmark rode 300 -> 320.
    assert!(results.returns.benchmark > 0.0);
}
