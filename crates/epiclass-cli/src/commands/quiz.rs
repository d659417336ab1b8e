//! The `epiclass quiz` command.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use epiclass_core::config::load_config_from;
use epiclass_core::model::Question;
use epiclass_core::parser;
use epiclass_core::traits::{QuestionPool, RandomSource};
use epiclass_core::{QuizEngine, QuizSession};

pub fn execute(
    bank: Option<PathBuf>,
    max_questions: Option<usize>,
    seed: Option<u64>,
    save: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let bank_path = bank.unwrap_or(config.quiz.question_bank);
    let max_questions = max_questions.unwrap_or(config.quiz.max_questions);
    anyhow::ensure!(max_questions >= 1, "max questions must be at least 1");

    let pool = parser::load_question_pool(&bank_path)?;
    tracing::info!(
        bank = %pool.id,
        questions = pool.questions.len(),
        "loaded question pool from {}",
        bank_path.display()
    );

    let engine = QuizEngine::new(pool, max_questions);
    let mut rng: Box<dyn RandomSource> = match seed.or(config.quiz.seed) {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::rng()),
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let session = run(&engine, &mut *rng, &mut input)?;

    println!(
        "\nAnswered {} question(s), {} correct.",
        session.answered(),
        session.correct_count()
    );

    if let Some(path) = save {
        session.save_json(&path)?;
        eprintln!("Session saved to: {}", path.display());
    }

    Ok(())
}

/// Drive a session to the end, reading answers line by line from `input`.
fn run<P, R>(engine: &QuizEngine<P>, rng: &mut R, input: &mut impl BufRead) -> Result<QuizSession>
where
    P: QuestionPool,
    R: RandomSource + ?Sized,
{
    let mut session = QuizSession::new();

    loop {
        let step = session.advance(engine, rng);
        println!("\n{}", step.message());

        let Some(question) = step.question else {
            break;
        };

        print_question(&question, session.answered() + 1);
        let Some(line) = read_answer(input)? else {
            println!("\nQuiz stopped. Score so far: {}", session.score);
            break;
        };

        let choice = resolve_choice(&question, &line);
        if session.answer(&choice) == Some(false) {
            println!("The answer was: {}", question.answer);
        }
        if let Some(explanation) = &question.explanation {
            println!("{explanation}");
        }
    }

    Ok(session)
}

fn print_question(question: &Question, number: usize) {
    println!("\nQ{number} [{}] {}", question.tier, question.text);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {option}", i + 1);
    }
    print!("Your answer: ");
    let _ = io::stdout().flush();
}

/// `None` on end of input.
fn read_answer(input: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed to read answer")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// An option number selects that option; anything else is taken as the answer text.
fn resolve_choice(question: &Question, line: &str) -> String {
    match line.parse::<usize>() {
        Ok(n) if (1..=question.options.len()).contains(&n) => question.options[n - 1].clone(),
        _ => line.to_string(),
    }
}
