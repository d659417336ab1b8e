//! The `epiclass validate` command.

use std::path::PathBuf;

use anyhow::Result;

use epiclass_core::model::Tier;
use epiclass_core::parser::{self, ValidationWarning};

pub fn execute(bank: Option<PathBuf>, scenarios: Option<PathBuf>) -> Result<()> {
    anyhow::ensure!(
        bank.is_some() || scenarios.is_some(),
        "nothing to validate: pass --bank and/or --scenarios"
    );

    let mut total_warnings = 0;

    if let Some(path) = bank {
        let banks = if path.is_dir() {
            parser::load_bank_directory(&path)?
        } else {
            vec![parser::parse_question_bank(&path)?]
        };
        anyhow::ensure!(!banks.is_empty(), "no question banks found in {}", path.display());

        for bank in &banks {
            let counts: Vec<String> = Tier::ALL
                .iter()
                .map(|t| format!("{} {t}", bank.count_tier(*t)))
                .collect();
            println!(
                "Question bank: {} ({} questions: {})",
                bank.name,
                bank.questions.len(),
                counts.join(", ")
            );
            let warnings = parser::validate_question_bank(bank);
            print_warnings(&warnings);
            total_warnings += warnings.len();
        }
    }

    if let Some(path) = scenarios {
        let set = parser::parse_scenario_set(&path)?;
        let baseline = set
            .baseline_scenario()
            .map(|s| s.name.as_str())
            .unwrap_or("-");
        println!(
            "Scenario set: {} ({} scenarios, baseline '{baseline}')",
            set.name,
            set.scenarios.len(),
        );
        let warnings = parser::validate_scenario_set(&set);
        print_warnings(&warnings);
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All files valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

fn print_warnings(warnings: &[ValidationWarning]) {
    for w in warnings {
        let prefix = w
            .item
            .as_ref()
            .map(|item| format!("  [{item}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }
}
