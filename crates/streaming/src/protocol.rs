//! Wire types for the news and analytics endpoints.
//!
//! - `GET /api/news/country/{id}/` → `[NewsItem]`
//! - `GET /api/analytics/country/?country={id}` → `RawAnalytics`
//!
//! The analytics payload may omit any of its fields; it is normalized into an
//! [`AnalyticsSummary`] whose fields are always present.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Scores above this are positive, below its negation negative.
pub const SENTIMENT_THRESHOLD: f64 = 0.3;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Missing scores read as neutral.
    pub fn classify(score: Option<f64>) -> Self {
        match score {
            Some(s) if s > SENTIMENT_THRESHOLD => SentimentLabel::Positive,
            Some(s) if s < -SENTIMENT_THRESHOLD => SentimentLabel::Negative,
            _ => SentimentLabel::Neutral,
        }
    }

    /// Tone of an averaged score: any positive mean reads positive.
    pub fn of_mean(mean: f64) -> Self {
        if mean > 0.0 {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        }
    }
}

/// One article as returned by the news endpoint, kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    #[serde(default)]
    pub llm_summary: Option<String>,
    /// Fields this client does not interpret (`description`, `entities`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewsItem {
    pub fn sentiment(&self) -> SentimentLabel {
        SentimentLabel::classify(self.sentiment_score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPoint {
    pub date: String,
    pub mean: f64,
    #[serde(default)]
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
}

/// Analytics payload as sent by the server; every field may be missing or null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawAnalytics {
    #[serde(default)]
    pub sentiment_trend: Option<Vec<SentimentPoint>>,
    #[serde(default)]
    pub entity_frequency: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub topic_distribution: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub llm_insights: Option<Vec<String>>,
}

/// Named entity split out of an `"<name>_<type>"` frequency key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityCount {
    pub name: String,
    pub kind: String,
    pub count: f64,
}

impl EntityCount {
    fn from_key(key: &str, count: f64) -> Self {
        let mut parts = key.split('_');
        let name = parts.next().unwrap_or_default().to_string();
        let kind = parts
            .next()
            .filter(|k| !k.is_empty())
            .unwrap_or("Unknown")
            .to_string();
        Self { name, kind, count }
    }
}

/// Normalized analytics; never partially undefined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsSummary {
    pub sentiment_trend: Vec<SentimentPoint>,
    pub entity_frequency: BTreeMap<String, f64>,
    pub topic_distribution: BTreeMap<String, f64>,
    pub llm_insights: Vec<String>,
}

impl AnalyticsSummary {
    pub fn normalize(raw: RawAnalytics) -> Self {
        Self {
            sentiment_trend: raw.sentiment_trend.unwrap_or_default(),
            entity_frequency: raw.entity_frequency.unwrap_or_default(),
            topic_distribution: raw.topic_distribution.unwrap_or_default(),
            llm_insights: raw.llm_insights.unwrap_or_default(),
        }
    }

    /// Mean sentiment of the first trend point.
    pub fn headline_sentiment(&self) -> Option<f64> {
        self.sentiment_trend.first().map(|p| p.mean)
    }

    /// Article count of the first trend point.
    pub fn article_count(&self) -> u64 {
        self.sentiment_trend.first().map_or(0, |p| p.count)
    }

    /// Heaviest topics first; equal weights keep key order.
    pub fn top_topics(&self, n: usize) -> Vec<(&str, f64)> {
        top_n(&self.topic_distribution, n)
    }

    pub fn top_entities(&self, n: usize) -> Vec<EntityCount> {
        top_n(&self.entity_frequency, n)
            .into_iter()
            .map(|(key, count)| EntityCount::from_key(key, count))
            .collect()
    }
}

fn top_n(map: &BTreeMap<String, f64>, n: usize) -> Vec<(&str, f64)> {
    let mut ranked: Vec<(&str, f64)> = map.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::{AnalyticsSummary, EntityCount, NewsItem, RawAnalytics, SentimentLabel};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn missing_analytics_fields_become_empty() {
        let raw: RawAnalytics = serde_json::from_value(json!({
            "sentiment_trend": [{ "date": "d", "mean": 0.5, "count": 3 }]
        }))
        .unwrap();
        let s = AnalyticsSummary::normalize(raw);
        assert_eq!(s.sentiment_trend.len(), 1);
        assert_eq!(s.sentiment_trend[0].date, "d");
        assert_eq!(s.sentiment_trend[0].mean, 0.5);
        assert_eq!(s.sentiment_trend[0].count, 3);
        assert!(s.entity_frequency.is_empty());
        assert!(s.topic_distribution.is_empty());
        assert!(s.llm_insights.is_empty());
    }

    #[test]
    fn null_fields_normalize_like_missing_ones() {
        let raw: RawAnalytics = serde_json::from_value(json!({
            "sentiment_trend": null,
            "entity_frequency": null,
            "topic_distribution": { "politics": 0.6 },
            "llm_insights": ["Elections dominate coverage."]
        }))
        .unwrap();
        let s = AnalyticsSummary::normalize(raw);
        assert!(s.sentiment_trend.is_empty());
        assert!(s.entity_frequency.is_empty());
        assert_eq!(s.topic_distribution.get("politics"), Some(&0.6));
        assert_eq!(s.llm_insights, vec!["Elections dominate coverage.".to_string()]);
        assert_eq!(s.headline_sentiment(), None);
        assert_eq!(s.article_count(), 0);
    }

    #[test]
    fn server_trend_points_with_std_are_accepted() {
        let raw: RawAnalytics = serde_json::from_value(json!({
            "sentiment_trend": [
                { "date": "2024-03-01", "mean": -0.2, "std": 0.1, "count": 12 },
                { "date": "2024-03-02", "mean": 0.4, "std": 0.3, "count": 8 }
            ]
        }))
        .unwrap();
        let s = AnalyticsSummary::normalize(raw);
        assert_eq!(s.headline_sentiment(), Some(-0.2));
        assert_eq!(s.article_count(), 12);
        assert_eq!(s.sentiment_trend[1].std, Some(0.3));
    }

    #[test]
    fn ranks_topics_and_entities() {
        let raw: RawAnalytics = serde_json::from_value(json!({
            "topic_distribution": { "a": 0.1, "b": 0.4, "c": 0.4, "d": 0.05, "e": 0.05 },
            "entity_frequency": { "Modi_PERSON": 5, "Delhi_GPE": 9, "ISRO": 2 }
        }))
        .unwrap();
        let s = AnalyticsSummary::normalize(raw);
        assert_eq!(s.top_topics(4), vec![("b", 0.4), ("c", 0.4), ("a", 0.1), ("d", 0.05)]);
        assert_eq!(
            s.top_entities(6),
            vec![
                EntityCount {
                    name: "Delhi".into(),
                    kind: "GPE".into(),
                    count: 9.0
                },
                EntityCount {
                    name: "Modi".into(),
                    kind: "PERSON".into(),
                    count: 5.0
                },
                EntityCount {
                    name: "ISRO".into(),
                    kind: "Unknown".into(),
                    count: 2.0
                },
            ]
        );
    }

    #[test]
    fn news_items_keep_unknown_fields() {
        let item: NewsItem = serde_json::from_value(json!({
            "title": "Monsoon arrives early",
            "source": "The Hindu",
            "published_date": "2024-06-01T08:00:00Z",
            "link": "https://example.org/monsoon",
            "sentiment_score": null,
            "llm_summary": null,
            "description": "Rains reach Kerala."
        }))
        .unwrap();
        assert_eq!(item.title, "Monsoon arrives early");
        assert_eq!(item.sentiment_score, None);
        assert_eq!(item.sentiment(), SentimentLabel::Neutral);
        assert_eq!(item.extra.get("description"), Some(&json!("Rains reach Kerala.")));
    }

    #[test]
    fn classifies_sentiment_scores() {
        assert_eq!(SentimentLabel::classify(Some(0.31)), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::classify(Some(0.3)), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::classify(Some(-0.3)), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::classify(Some(-0.5)), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::classify(None), SentimentLabel::Neutral);
    }

    #[test]
    fn averaged_scores_split_at_zero() {
        assert_eq!(SentimentLabel::of_mean(0.05), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::of_mean(0.0), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::of_mean(-0.2), SentimentLabel::Negative);
    }
}
