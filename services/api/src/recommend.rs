use crate::infra::{load_answers, read_knowledge_base};
use clap::Args;
use profguide::error::AppError;
use profguide::inference::{
    EngineConfig, InferenceEngine, RankingOptions, RecommendationList, RecommendationResult,
    ScoringMethod, WeightedRecommendation,
};
use profguide::knowledge::{KnowledgeBaseStats, DEFAULT_TOP_N};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// Knowledge base JSON file
    #[arg(long)]
    pub(crate) knowledge_base: PathBuf,
    /// Answers JSON file mapping question ids to ordinals 0..=3
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Number of recommendations to keep when truncating
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub(crate) top_n: usize,
    /// Scoring method: certainty_factor (default) or weighted
    #[arg(long, value_parser = parse_method, default_value = "certainty_factor")]
    pub(crate) method: ScoringMethod,
    /// Keep only the best `top_n` professions
    #[arg(long)]
    pub(crate) truncate: bool,
    /// Drop professions without positive support
    #[arg(long)]
    pub(crate) positive_only: bool,
}

#[derive(Args, Debug)]
pub(crate) struct StatsArgs {
    /// Knowledge base JSON file
    #[arg(long)]
    pub(crate) knowledge_base: PathBuf,
}

pub(crate) fn parse_method(raw: &str) -> Result<ScoringMethod, String> {
    ScoringMethod::parse(raw)
        .ok_or_else(|| format!("unknown scoring method '{raw}' (expected certainty_factor or weighted)"))
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let knowledge_base = read_knowledge_base(&args.knowledge_base)?;
    let answers = load_answers(&args.answers)?;
    let config = EngineConfig {
        ranking: RankingOptions {
            truncate: args.truncate,
            positive_only: args.positive_only,
        },
        ..EngineConfig::default()
    };

    let engine = InferenceEngine::new(Arc::new(knowledge_base), config);
    let recommendations = engine.recommend(&answers, args.method, args.top_n);

    println!(
        "Recommendations ({}, {} answers)",
        args.method.label(),
        answers.len()
    );
    print!("{}", render_recommendations(&recommendations));
    Ok(())
}

pub(crate) fn run_stats(args: StatsArgs) -> Result<(), AppError> {
    let knowledge_base = read_knowledge_base(&args.knowledge_base)?;
    print!("{}", render_stats(&knowledge_base.stats()));
    Ok(())
}

pub(crate) fn render_recommendations(recommendations: &RecommendationList) -> String {
    if recommendations.is_empty() {
        return "  (no professions to rank)\n".to_string();
    }
    match recommendations {
        RecommendationList::CertaintyFactor(results) => results
            .iter()
            .enumerate()
            .map(|(index, result)| render_certainty(index + 1, result))
            .collect(),
        RecommendationList::Weighted(results) => results
            .iter()
            .enumerate()
            .map(|(index, result)| render_weighted(index + 1, result))
            .collect(),
    }
}

fn render_certainty(position: usize, result: &RecommendationResult) -> String {
    format!(
        "{position:>3}. {:<28} {:>6.1}%  (cf {:+.4})\n",
        result.name, result.percentage, result.raw_cf
    )
}

fn render_weighted(position: usize, result: &WeightedRecommendation) -> String {
    format!(
        "{position:>3}. {:<28} {:>6.1}%  ({} / {})\n",
        result.name, result.percentage, result.score, result.max_score
    )
}

pub(crate) fn render_stats(stats: &KnowledgeBaseStats) -> String {
    format!(
        "Questions:   {}\nProfessions: {}\nRules:       {}\n",
        stats.questions, stats.professions, stats.rules
    )
}
