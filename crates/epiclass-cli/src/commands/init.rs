//! The `epiclass init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("epiclass.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("question-banks")?;
    write_if_missing(Path::new("question-banks/example.toml"), EXAMPLE_BANK)?;

    std::fs::create_dir_all("scenarios")?;
    write_if_missing(Path::new("scenarios/example.toml"), EXAMPLE_SCENARIOS)?;

    println!("\nNext steps:");
    println!("  1. Run: epiclass validate --bank question-banks --scenarios scenarios/example.toml");
    println!("  2. Run: epiclass simulate --r0 2.5 --intervention 20:0.5");
    println!("  3. Run: epiclass compare --scenarios scenarios/example.toml");
    println!("  4. Run: epiclass quiz");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# epiclass configuration

parallelism = 4
output_dir = "./epiclass-results"

[simulation]
population_size = 1000
initial_infectious = 10
r0 = 2.0
incubation_rate = 0.2
recovery_rate = 0.143
fatality_fraction = 0.0
horizon_days = 120

[quiz]
max_questions = 10
question_bank = "question-banks"
# seed = 42
"#;

const EXAMPLE_BANK: &str = r#"[bank]
id = "example"
name = "Example Question Bank"
description = "A few questions to get started"

[[questions]]
text = "What does R0 measure?"
options = ["Average secondary cases from one case in a susceptible population", "Deaths per 1000 cases", "Days from exposure to symptoms"]
answer = "Average secondary cases from one case in a susceptible population"
tier = "basic"

[[questions]]
text = "Which compartment holds people infected but not yet infectious?"
options = ["Susceptible", "Exposed", "Removed"]
answer = "Exposed"
tier = "intermediate"

[[questions]]
text = "If an intervention cuts transmission by 60% and R0 is 2.5, what is the new reproduction number?"
options = ["1.5", "1.0", "0.6"]
answer = "1.0"
tier = "advanced"
explanation = "2.5 x (1 - 0.6) = 1.0"
"#;

const EXAMPLE_SCENARIOS: &str = r#"[scenario_set]
id = "example"
name = "Example outbreak"
baseline = "no action"
start_date = "2024-01-01"

[scenario_set.params]
population_size = 1000
initial_infectious = 10
r0 = 2.0
incubation_period_days = 5
infectious_period_days = 7
horizon_days = 120

[[scenarios]]
name = "no action"

[[scenarios]]
name = "distancing"
description = "Halve transmission from day 20"
interventions = [{ trigger_day = 20, reduction = 0.5 }]
"#;
