use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use epiclass_core::model::{AnswerRecord, Question, Tier};
use epiclass_core::quiz::QuizEngine;

fn make_pool(per_tier: usize) -> Vec<Question> {
    Tier::ALL
        .iter()
        .flat_map(|&tier| {
            (0..per_tier).map(move |i| Question {
                text: format!("{tier} question {i}"),
                options: vec!["yes".into(), "no".into()],
                answer: "yes".into(),
                tier,
                explanation: None,
                tags: vec![],
            })
        })
        .collect()
}

fn bench_next_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_step");

    for per_tier in [10usize, 100, 1000] {
        let engine = QuizEngine::new(make_pool(per_tier), usize::MAX);
        let history: Vec<AnswerRecord> = (0..per_tier / 2)
            .map(|i| AnswerRecord {
                question_text: format!("basic question {i}"),
                tier: Tier::Basic,
                correct: false,
            })
            .collect();
        let mut rng = StdRng::seed_from_u64(1);

        group.bench_function(format!("pool={}", per_tier * 3), |b| {
            b.iter(|| engine.next_step(black_box(&history), black_box(40), &mut rng))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_next_step);
criterion_main!(benches);
