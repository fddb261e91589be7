use crate::infra::InMemoryStore;
use crate::recommend::{parse_method, render_recommendations, render_stats};
use clap::Args;
use profguide::error::AppError;
use profguide::inference::ScoringMethod;
use profguide::knowledge::{
    AnswerSet, KnowledgeBase, KnowledgeBaseService, Profession, ProfessionId, Question,
    QuestionId, Rule, ServiceSettings, WeightMap, DEFAULT_ANSWER_LABELS,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Scoring method: certainty_factor (default) or weighted
    #[arg(long, value_parser = parse_method, default_value = "certainty_factor")]
    pub(crate) method: ScoringMethod,
    /// Answer profile to score: analyst, caregiver, or maker
    #[arg(long, default_value = "analyst")]
    pub(crate) profile: String,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let answers = sample_answers(&args.profile).ok_or_else(|| {
        AppError::Input(format!(
            "unknown profile '{}' (expected analyst, caregiver, or maker)",
            args.profile
        ))
    })?;

    let store = Arc::new(InMemoryStore::seeded(sample_knowledge_base()));
    let service = KnowledgeBaseService::open(store, ServiceSettings::default())?;

    println!("=== Sample knowledge base ===");
    print!("{}", render_stats(&service.stats()));

    println!("\n=== Answers ({}) ===", args.profile);
    let snapshot = service.snapshot();
    for question in &snapshot.questions {
        let label = answers
            .get(&question.id)
            .and_then(|ordinal| usize::try_from(ordinal).ok())
            .and_then(|ordinal| question.answers.get(ordinal))
            .map(String::as_str)
            .unwrap_or("(skipped)");
        println!("{:<4} {:<44} {}", question.id.as_str(), question.text, label);
    }

    println!("\n=== Recommendations ({}) ===", args.method.label());
    let recommendations = service.recommend(&answers, args.method, None);
    print!("{}", render_recommendations(&recommendations));
    Ok(())
}

fn question(id: &str, text: &str) -> Question {
    Question {
        id: QuestionId::from(id),
        text: text.to_string(),
        answers: DEFAULT_ANSWER_LABELS.iter().map(|label| label.to_string()).collect(),
    }
}

fn profession(id: &str, name: &str, description: &str) -> Profession {
    Profession {
        id: ProfessionId::from(id),
        name: name.to_string(),
        description: description.to_string(),
    }
}

fn rule(question_id: &str, weights: &[(&str, f64)]) -> Rule {
    Rule {
        question_id: QuestionId::from(question_id),
        professions: weights.iter().copied().collect::<WeightMap>(),
    }
}

pub(crate) fn sample_knowledge_base() -> KnowledgeBase {
    KnowledgeBase {
        questions: vec![
            question("q1", "Do you enjoy working with numbers?"),
            question("q2", "Do you like helping people directly?"),
            question("q3", "Do you prefer working with your hands?"),
            question("q4", "Are you comfortable spending long hours at a screen?"),
            question("q5", "Do you enjoy explaining things to others?"),
        ],
        professions: vec![
            profession("accountant", "Accountant", "Keeps financial records in order"),
            profession("developer", "Software developer", "Designs and builds software"),
            profession("nurse", "Nurse", "Cares for patients in clinics and hospitals"),
            profession("teacher", "Teacher", "Teaches and mentors students"),
            profession("carpenter", "Carpenter", "Builds and repairs wooden structures"),
        ],
        rules: vec![
            rule(
                "q1",
                &[("accountant", 0.9), ("developer", 0.6), ("nurse", -0.2), ("carpenter", -0.3)],
            ),
            rule(
                "q2",
                &[("nurse", 0.9), ("teacher", 0.7), ("developer", -0.3), ("accountant", -0.3)],
            ),
            rule(
                "q3",
                &[("carpenter", 0.9), ("nurse", 0.4), ("developer", -0.4), ("accountant", -0.5)],
            ),
            rule(
                "q4",
                &[("developer", 0.8), ("accountant", 0.6), ("carpenter", -0.7), ("nurse", -0.5)],
            ),
            rule("q5", &[("teacher", 0.9), ("nurse", 0.3), ("developer", 0.2)]),
        ],
    }
}

pub(crate) fn sample_answers(profile: &str) -> Option<AnswerSet> {
    let ordinals: [i64; 5] = match profile {
        "analyst" => [3, 1, 0, 3, 1],
        "caregiver" => [1, 3, 2, 0, 2],
        "maker" => [0, 1, 3, 0, 1],
        _ => return None,
    };
    Some(
        ["q1", "q2", "q3", "q4", "q5"]
            .into_iter()
            .zip(ordinals)
            .collect(),
    )
}
