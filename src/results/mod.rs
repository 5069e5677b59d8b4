//! Results view: metrics, chart series and keyword cross-reference.

pub mod keywords;
pub mod metrics;
pub mod view;

pub use keywords::{
    keyword_tags, normalize_keyword, KeywordIndex, KeywordLookup, KeywordModal, KeywordTag,
};
pub use metrics::{chart_series, ChartPoint, MetricSummary};
pub use view::{ModalView, ResultSource, ResultsState, ResultsView};
