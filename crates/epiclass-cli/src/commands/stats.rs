//! The `epiclass stats` command.

use anyhow::Result;

use epiclass_core::statistics::{Measure, TwoByTwo};
use epiclass_core::StatisticsError;

pub fn execute(a: f64, b: f64, c: f64, d: f64, correct_zeros: bool) -> Result<()> {
    anyhow::ensure!(
        [a, b, c, d].iter().all(|v| v.is_finite() && *v >= 0.0),
        "cell counts must be non-negative numbers"
    );

    let mut table = TwoByTwo::new(a, b, c, d);
    println!("            Cases   Non-cases   Risk");
    println!(
        "Exposed     {a:>5}   {b:>9}   {}",
        fmt_risk(table.exposed_risk())
    );
    println!(
        "Unexposed   {c:>5}   {d:>9}   {}",
        fmt_risk(table.unexposed_risk())
    );
    println!();

    let has_zero = [a, b, c, d].contains(&0.0);
    if has_zero && correct_zeros {
        println!("A cell is zero; adding 0.5 to every cell.\n");
        table = table.with_continuity_correction();
    }

    print_measure("Risk ratio", table.risk_ratio(), 1.0);
    print_measure("Odds ratio", table.odds_ratio(), 1.0);
    print_measure("Risk difference", table.risk_difference(), 0.0);

    Ok(())
}

fn fmt_risk(risk: Result<f64, StatisticsError>) -> String {
    risk.map(|r| format!("{:.3}", r))
        .unwrap_or_else(|_| "-".into())
}

fn print_measure(label: &str, measure: Result<Measure, StatisticsError>, null: f64) {
    match measure {
        Ok(m) => {
            let verdict = if m.excludes(null) {
                "significant"
            } else {
                "not significant"
            };
            println!(
                "{label:<16} {:.3} (95% CI {:.3} to {:.3}) {verdict}",
                m.estimate, m.lower, m.upper
            );
        }
        Err(e) if e.is_zero_cell() => {
            println!("{label:<16} undefined: {e} (try --correct-zeros)");
        }
        Err(e) => println!("{label:<16} undefined: {e}"),
    }
}
