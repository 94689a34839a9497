//! Partitioning of insights into personality and knowledge facts.

use crate::record::{Insight, VideoRecord};

/// Bucket an insight tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightCategory {
    /// `mental_state`, `personality`, `interest`, `opinion`.
    Personality,
    /// `knowledge`, `experience`, `goal`, `skill`.
    Knowledge,
    /// Any other tag. Kept on the record, left out of the context.
    Unclassified,
}

impl InsightCategory {
    pub fn of(tag: &str) -> Self {
        match tag {
            "mental_state" | "personality" | "interest" | "opinion" => Self::Personality,
            "knowledge" | "experience" | "goal" | "skill" => Self::Knowledge,
            _ => Self::Unclassified,
        }
    }
}

/// Insight texts split by category, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedInsights {
    pub personality: Vec<String>,
    pub knowledge: Vec<String>,
}

impl ClassifiedInsights {
    pub fn is_empty(&self) -> bool {
        self.personality.is_empty() && self.knowledge.is_empty()
    }

    fn extend(&mut self, other: ClassifiedInsights) {
        self.personality.extend(other.personality);
        self.knowledge.extend(other.knowledge);
    }
}

/// Classify one record's insights.
pub fn classify(insights: &[Insight]) -> ClassifiedInsights {
    let mut out = ClassifiedInsights::default();
    for insight in insights.iter().filter(|i| !i.insight.trim().is_empty()) {
        match InsightCategory::of(&insight.kind) {
            InsightCategory::Personality => out.personality.push(insight.insight.clone()),
            InsightCategory::Knowledge => out.knowledge.push(insight.insight.clone()),
            InsightCategory::Unclassified => {}
        }
    }
    out
}

/// Classify each record independently and concatenate in record order.
pub fn classify_records<'a>(records: impl IntoIterator<Item = &'a VideoRecord>) -> ClassifiedInsights {
    records
        .into_iter()
        .fold(ClassifiedInsights::default(), |mut acc, record| {
            acc.extend(classify(&record.insights));
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_by_tag() {
        let insights = vec![
            Insight::new("personality", "Easygoing"),
            Insight::new("skill", "Writes Rust"),
            Insight::new("opinion", "Prefers vim"),
            Insight::new("goal", "Ship a product"),
            Insight::new("mental_state", "Relaxed"),
            Insight::new("experience", "Lived in Berlin"),
            Insight::new("interest", "Synths"),
            Insight::new("knowledge", "Knows Docker"),
        ];

        let out = classify(&insights);
        assert_eq!(out.personality, vec!["Easygoing", "Prefers vim", "Relaxed", "Synths"]);
        assert_eq!(
            out.knowledge,
            vec!["Writes Rust", "Ship a product", "Lived in Berlin", "Knows Docker"]
        );
    }

    #[test]
    fn test_unknown_tags_dropped() {
        let insights = vec![
            Insight::new("mood", "Tired"),
            Insight::new("", "Untyped"),
            Insight::new("Personality", "Case matters"),
        ];
        assert!(classify(&insights).is_empty());
    }

    #[test]
    fn test_no_insight_in_both_buckets_and_no_fabrication() {
        let tags = [
            "mental_state", "personality", "interest", "opinion", "knowledge", "experience",
            "goal", "skill", "other",
        ];
        let insights: Vec<Insight> = tags
            .iter()
            .map(|t| Insight::new(t, &format!("text-{}", t)))
            .collect();

        let out = classify(&insights);
        for text in &out.personality {
            assert!(!out.knowledge.contains(text));
        }
        let inputs: Vec<&str> = insights.iter().map(|i| i.insight.as_str()).collect();
        for text in out.personality.iter().chain(out.knowledge.iter()) {
            assert!(inputs.contains(&text.as_str()));
        }
        assert_eq!(out.personality.len() + out.knowledge.len(), 8);
    }

    #[test]
    fn test_blank_insights_skipped() {
        let insights = vec![
            Insight::new("opinion", ""),
            Insight::new("skill", "  "),
            Insight::new("interest", "Synths"),
        ];

        let out = classify(&insights);
        assert_eq!(out.personality, vec!["Synths"]);
        assert!(out.knowledge.is_empty());
    }

    #[test]
    fn test_records_flatten_in_rank_order() {
        let mut first = VideoRecord::empty("1", "1");
        first.insights = vec![Insight::new("skill", "A"), Insight::new("opinion", "B")];
        let mut second = VideoRecord::empty("2", "2");
        second.insights = vec![Insight::new("knowledge", "C"), Insight::new("interest", "D")];

        let out = classify_records([&first, &second]);
        assert_eq!(out.personality, vec!["B", "D"]);
        assert_eq!(out.knowledge, vec!["A", "C"]);
    }
}
