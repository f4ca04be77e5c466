//! Rendering collaborators: the globe camera seam and the text side panel.

use std::fmt::{self, Write};

use foundation::ids::CountryId;
use scene::extent::{Extent, compute_extent};
use scene::feature::CountryFeature;
use scene::framing::{CameraPose, FramingPolicy};
use serde::Serialize;
use streaming::orchestrator::CountryDataset;
use streaming::protocol::{EntityCount, NewsItem, SentimentLabel, SentimentPoint};
use tracing::info;

/// Topics shown in the side panel.
pub const TOP_TOPICS: usize = 4;
/// Entities shown in the side panel.
pub const TOP_ENTITIES: usize = 6;

/// The 3-D globe as seen by the controller.
pub trait GlobeRenderer {
    /// Animate the camera to `pose` over `transition_ms`.
    fn point_of_view(&mut self, pose: CameraPose, transition_ms: u64);

    fn set_auto_rotate(&mut self, enabled: bool);
}

/// Headless renderer that logs camera instructions and remembers the last one.
#[derive(Debug, Default)]
pub struct LogRenderer {
    pose: Option<CameraPose>,
    auto_rotate: bool,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pose(&self) -> Option<CameraPose> {
        self.pose
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }
}

impl GlobeRenderer for LogRenderer {
    fn point_of_view(&mut self, pose: CameraPose, transition_ms: u64) {
        info!(
            lat = pose.lat,
            lng = pose.lng,
            altitude = pose.altitude,
            transition_ms,
            "camera point of view"
        );
        self.pose = Some(pose);
    }

    fn set_auto_rotate(&mut self, enabled: bool) {
        if self.auto_rotate != enabled {
            info!(enabled, "auto-rotate");
        }
        self.auto_rotate = enabled;
    }
}

/// Average tone of the coverage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headline {
    pub mean: f64,
    pub label: SentimentLabel,
    pub articles: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicShare<'a> {
    pub topic: &'a str,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsCard<'a> {
    #[serde(flatten)]
    pub item: &'a NewsItem,
    pub label: SentimentLabel,
}

/// What the side panel shows for one country, in display order.
///
/// While loading or after a failure only the status is filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView<'a> {
    pub name: &'a str,
    pub country: Option<&'a str>,
    pub loading: bool,
    pub error: Option<&'a str>,
    pub headline: Option<Headline>,
    pub sentiment_trend: &'a [SentimentPoint],
    pub topics: Vec<TopicShare<'a>>,
    pub entities: Vec<EntityCount>,
    pub insights: &'a [String],
    pub news: Vec<NewsCard<'a>>,
}

impl<'a> PanelView<'a> {
    pub fn new(name: &'a str, dataset: &'a CountryDataset) -> Self {
        let mut view = Self {
            name,
            country: dataset.country.as_ref().map(CountryId::as_str),
            loading: dataset.loading,
            error: dataset.error.as_deref(),
            headline: None,
            sentiment_trend: &[],
            topics: Vec::new(),
            entities: Vec::new(),
            insights: &[],
            news: Vec::new(),
        };
        if view.loading || view.error.is_some() {
            return view;
        }

        if let Some(analytics) = &dataset.analytics {
            view.headline = analytics.headline_sentiment().map(|mean| Headline {
                mean,
                label: SentimentLabel::of_mean(mean),
                articles: analytics.article_count(),
            });
            view.sentiment_trend = &analytics.sentiment_trend;
            view.topics = analytics
                .top_topics(TOP_TOPICS)
                .into_iter()
                .map(|(topic, share)| TopicShare { topic, share })
                .collect();
            view.entities = analytics.top_entities(TOP_ENTITIES);
            view.insights = &analytics.llm_insights;
        }
        view.news = dataset
            .news
            .iter()
            .map(|item| NewsCard {
                item,
                label: item.sentiment(),
            })
            .collect();
        view
    }
}

/// Plain-text rendering of the country panel.
pub fn render_panel(name: &str, dataset: &CountryDataset) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_panel(&mut out, &PanelView::new(name, dataset));
    out
}

fn write_panel(out: &mut String, view: &PanelView<'_>) -> std::fmt::Result {
    writeln!(out, "{}", view.name)?;
    if view.loading {
        return writeln!(out, "Loading...");
    }
    if let Some(error) = view.error {
        return writeln!(out, "{error}");
    }

    if let Some(h) = &view.headline {
        writeln!(
            out,
            "Sentiment: {:.2} ({}) across {} articles",
            h.mean,
            h.label.as_str(),
            h.articles
        )?;
    }
    if !view.topics.is_empty() {
        writeln!(out, "Top topics:")?;
        for t in &view.topics {
            writeln!(out, "  {} {:.1}%", t.topic, t.share * 100.0)?;
        }
    }
    if !view.entities.is_empty() {
        writeln!(out, "Key entities:")?;
        for e in &view.entities {
            writeln!(out, "  {} ({}) x{}", e.name, e.kind, e.count)?;
        }
    }
    if !view.insights.is_empty() {
        writeln!(out, "Insights:")?;
        for insight in view.insights {
            writeln!(out, "  - {insight}")?;
        }
    }

    if view.news.is_empty() {
        writeln!(out, "No news available.")?;
    } else {
        writeln!(out, "News:")?;
        for card in &view.news {
            let item = card.item;
            write!(out, "  [{}] {}", card.label.as_str(), item.title)?;
            let meta: Vec<&str> = [item.source.as_deref(), item.published_date.as_deref()]
                .into_iter()
                .flatten()
                .collect();
            if !meta.is_empty() {
                write!(out, " ({})", meta.join(", "))?;
            }
            writeln!(out)?;
            if let Some(summary) = &item.llm_summary {
                writeln!(out, "      {summary}")?;
            }
        }
    }
    Ok(())
}

/// One line of the `extents` listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtentRow<'a> {
    pub id: Option<&'a str>,
    pub name: &'a str,
    pub extent: Extent,
    pub camera: CameraPose,
}

impl<'a> ExtentRow<'a> {
    pub fn new(feature: &'a CountryFeature, framing: &FramingPolicy) -> Self {
        let extent = compute_extent(feature.geometry.as_ref());
        Self {
            id: feature.id.as_ref().map(CountryId::as_str),
            name: feature.name(),
            camera: framing.framing_for(feature.id.as_ref(), &extent),
            extent,
        }
    }
}

impl fmt::Display for ExtentRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (e, c) = (&self.extent, &self.camera);
        write!(
            f,
            "{:>4} {:<32} center=({:.2}, {:.2}) size={:.2} camera=({:.2}, {:.2}, alt {:.2})",
            self.id.unwrap_or_default(),
            self.name,
            e.lat,
            e.lng,
            e.size(),
            c.lat,
            c.lng,
            c.altitude
        )
    }
}
