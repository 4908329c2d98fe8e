//! Human-readable summary of a backtest run.

use signalback_core::domain::{Action, BacktestResults};

/// Render the results as a plain-text report for terminal output.
pub fn render_summary(results: &BacktestResults) -> String {
    let buy_trades = results
        .transactions
        .iter()
        .filter(|t| t.action == Action::Buy)
        .count();
    let sell_trades = results
        .transactions
        .iter()
        .filter(|t| t.action == Action::Sell)
        .count();

    let verdict = if results.outperformance.absolute > 0.0 {
        format!(
            "The agent strategy beat buy-and-hold by ${:.2}.",
            results.outperformance.absolute
        )
    } else {
        format!(
            "The agent strategy underperformed buy-and-hold by ${:.2}.",
            results.outperformance.absolute.abs()
        )
    };

    format!(
        "\
BACKTEST RESULTS
================
Period:           {} to {} ({} trading days)
Initial capital:  ${:.2}

Final values
  Agent:          ${:.2}
  Buy & hold:     ${:.2}

Returns
  Agent:          {:+.2}%
  Buy & hold:     {:+.2}%

Outperformance
  Absolute:       ${:+.2}
  Relative:       {:+.2}%

Trades
  Buys:           {}
  Sells:          {}
  Total:          {}

Final portfolio:  cash ${:.2}, {:.4} shares

{}
",
        results.period.start,
        results.period.end,
        results.period.days,
        results.initial_capital,
        results.final_values.agent,
        results.final_values.benchmark,
        results.returns.agent * 100.0,
        results.returns.benchmark * 100.0,
        results.outperformance.absolute,
        results.outperformance.relative * 100.0,
        buy_trades,
        sell_trades,
        results.transactions.len(),
        results.final_portfolio.cash,
        results.final_portfolio.shares,
        verdict,
    )
}
