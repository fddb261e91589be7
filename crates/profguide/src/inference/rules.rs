use tracing::debug;

use super::config::EngineConfig;
use super::ProfessionSlots;
use crate::knowledge::{AnswerSet, Rule};

/// Signed evidence a single rule pushes towards one profession.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Contribution {
    pub slot: usize,
    pub cf: f64,
}

/// Streams surviving contributions in rule order, then in weight-map order.
pub(crate) fn contributions<'a>(
    rules: &'a [Rule],
    slots: &'a ProfessionSlots<'a>,
    answers: &'a AnswerSet,
    config: &'a EngineConfig,
) -> impl Iterator<Item = Contribution> + 'a {
    rules
        .iter()
        .filter_map(move |rule| {
            let ordinal = answers.get(&rule.question_id)?;
            let evidence = config.evidence.evidence_for(ordinal);
            if evidence.abs() < config.evidence_threshold {
                debug!(question = %rule.question_id, ordinal, "evidence below noise threshold");
                return None;
            }
            Some((rule, evidence))
        })
        .flat_map(move |(rule, evidence)| {
            rule.professions.iter().filter_map(move |(profession, weight)| {
                let Some(slot) = slots.slot(profession) else {
                    debug!(%profession, question = %rule.question_id, "rule references unknown profession");
                    return None;
                };

                let rule_strength = weight.abs();
                let sign = if weight < 0.0 { -1.0 } else { 1.0 };
                let cf = evidence * rule_strength * sign;

                if cf.abs() < config.contribution_threshold {
                    return None;
                }
                Some(Contribution { slot, cf })
            })
        })
}
