use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Labels given to a new question when the editor does not supply its own.
pub const DEFAULT_ANSWER_LABELS: [&str; 4] =
    ["Definitely not", "Probably not", "Probably yes", "Yes"];

/// Number of ordinal answer positions every question exposes.
pub const ANSWER_LABEL_COUNT: usize = 4;

/// Identifier wrapper for questionnaire questions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl QuestionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identifier wrapper for recommendable professions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfessionId(pub String);

impl ProfessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProfessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Questionnaire entry; `answers` holds the labels for ordinals 0..=3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profession {
    pub id: ProfessionId,
    pub name: String,
    pub description: String,
}

/// Profession weights attached to a rule, kept in document order.
///
/// Iteration order feeds the certainty-factor fold, so the mapping is stored as
/// a sequence rather than a hash map. Serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightMap(Vec<(ProfessionId, f64)>);

impl WeightMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites a weight. Overwriting keeps the original position.
    pub fn insert(&mut self, profession: ProfessionId, weight: f64) {
        match self.0.iter_mut().find(|(id, _)| *id == profession) {
            Some(entry) => entry.1 = weight,
            None => self.0.push((profession, weight)),
        }
    }

    pub fn remove(&mut self, profession: &ProfessionId) -> Option<f64> {
        let position = self.0.iter().position(|(id, _)| id == profession)?;
        Some(self.0.remove(position).1)
    }

    pub fn get(&self, profession: &ProfessionId) -> Option<f64> {
        self.0
            .iter()
            .find(|(id, _)| id == profession)
            .map(|(_, weight)| *weight)
    }

    pub fn contains(&self, profession: &ProfessionId) -> bool {
        self.get(profession).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProfessionId, f64)> {
        self.0.iter().map(|(id, weight)| (id, *weight))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<P: Into<ProfessionId>> FromIterator<(P, f64)> for WeightMap {
    fn from_iter<I: IntoIterator<Item = (P, f64)>>(iter: I) -> Self {
        let mut map = WeightMap::new();
        for (profession, weight) in iter {
            map.insert(profession.into(), weight);
        }
        map
    }
}

impl Serialize for WeightMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for WeightMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // serde_json is built with preserve_order, so the object keeps document order
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(profession, weight)| match weight.as_f64() {
                Some(weight) => Ok((profession, weight)),
                None => Err(<D::Error as serde::de::Error>::custom(format!(
                    "weight for profession '{profession}' must be a number"
                ))),
            })
            .collect()
    }
}

/// Associates one question with signed weights for the professions it informs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub question_id: QuestionId,
    pub professions: WeightMap,
}

/// Immutable snapshot of questions, professions, and rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub questions: Vec<Question>,
    pub professions: Vec<Profession>,
    pub rules: Vec<Rule>,
}

impl KnowledgeBase {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> KnowledgeBaseStats {
        KnowledgeBaseStats {
            questions: self.questions.len(),
            professions: self.professions.len(),
            rules: self.rules.len(),
        }
    }

    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == *id)
    }

    pub fn profession(&self, id: &ProfessionId) -> Option<&Profession> {
        self.professions.iter().find(|profession| profession.id == *id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnowledgeBaseStats {
    pub questions: usize,
    pub professions: usize,
    pub rules: usize,
}

/// Per-call mapping from question to the chosen ordinal.
///
/// Ordinals are not range checked here; values outside 0..=3 reach the engine
/// and carry no evidence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet {
    answers: HashMap<QuestionId, i64>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translates transport-level answers. Booleans count as 1 and 0, other
    /// non-numeric values are dropped.
    pub fn from_raw<I, K>(raw: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        raw.into_iter()
            .filter_map(|(key, value)| {
                parse_ordinal(&value).map(|ordinal| (QuestionId(key.into()), ordinal))
            })
            .collect()
    }

    pub fn insert(&mut self, question: QuestionId, ordinal: i64) {
        self.answers.insert(question, ordinal);
    }

    pub fn get(&self, question: &QuestionId) -> Option<i64> {
        self.answers.get(question).copied()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl<Q: Into<QuestionId>> FromIterator<(Q, i64)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (Q, i64)>>(iter: I) -> Self {
        Self {
            answers: iter
                .into_iter()
                .map(|(question, ordinal)| (question.into(), ordinal))
                .collect(),
        }
    }
}

impl From<String> for QuestionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<String> for ProfessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

fn parse_ordinal(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.is_finite())
                .map(|float| float.trunc() as i64)
        }),
        Value::String(raw) => raw.trim().parse::<i64>().ok(),
        Value::Bool(flag) => Some(i64::from(*flag)),
        _ => None,
    }
}
