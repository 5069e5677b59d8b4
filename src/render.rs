//! Terminal rendering for each view.

use std::fmt::Write;

use console::style;

use crate::history::HistoryBrowser;
use crate::models::{AnalysisResult, KeySection};
use crate::results::{
    chart_series, ChartPoint, KeywordLookup, MetricSummary, ModalView, ResultsState, ResultsView,
};
use crate::upload::UploadForm;

const BAR_WIDTH: usize = 40;
const RULE: &str = "────────────────────────────────────────────────────────";

pub const NO_SUMMARY: &str = "요약 정보가 없습니다.";
pub const NO_KEYWORDS: &str = "키워드 정보가 없습니다.";
pub const NO_RELATED_CONTENT: &str = "이 키워드와 관련된 내용을 찾을 수 없습니다.";
pub const NO_HISTORY: &str = "분석 이력이 없습니다.";
pub const LOADING_RESULT: &str = "분석 결과를 불러오는 중...";
pub const LOADING_HISTORY: &str = "분석 이력을 불러오는 중...";

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", style(title).bold().underlined());
}

/// Upload form summary.
pub fn render_upload(form: &UploadForm) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style("PDF 문서 분석").bold());
    let _ = writeln!(
        out,
        "문서 유형: {} ({})",
        form.document_type().label(),
        form.document_type()
    );
    let file = form
        .file()
        .map(|f| format!("{} ({} bytes)", f.file_name, f.bytes.len()))
        .unwrap_or_else(|| "파일 선택...".to_string());
    let _ = writeln!(out, "파일: {}", file);
    if let Some(err) = form.error() {
        let _ = writeln!(out, "{} {}", style("!").red().bold(), style(err).red());
    }
    let control = if form.control().is_pending() {
        "분석 중..."
    } else if form.can_submit() {
        "[분석 시작]"
    } else {
        "[분석 시작] (비활성)"
    };
    let _ = writeln!(out, "{}", control);
    out
}

/// Results page for whatever state the view is in.
pub fn render_results(view: &ResultsView) -> String {
    match view.state() {
        ResultsState::Loading => format!("{}\n", style(LOADING_RESULT).dim()),
        ResultsState::Unavailable(err) => format!(
            "{} {}\n",
            style("✗").red().bold(),
            style(err.user_message()).red()
        ),
        ResultsState::Ready(result) => {
            let mut out = render_result(result);
            if let Some(modal) = view.modal_view() {
                out.push_str(&render_modal(&modal));
            }
            out
        }
    }
}

/// A ready result: header, summary, keywords, metrics, warnings, key sections.
pub fn render_result(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style(&result.file_name).bold().cyan());
    let _ = writeln!(
        out,
        "분석 ID: {} | 유형: {} | 총 페이지: {} | 총 셀: {}",
        result.analysis_id,
        result.document_type.label(),
        result.total_pages,
        result.total_cells
    );

    heading(&mut out, "요약");
    let _ = writeln!(out, "{}", result.summary.as_deref().unwrap_or(NO_SUMMARY));

    heading(&mut out, "키워드");
    if result.keywords.is_empty() {
        let _ = writeln!(out, "{}", NO_KEYWORDS);
    } else {
        let tags: Vec<String> = result
            .display_keywords()
            .enumerate()
            .map(|(i, k)| format!("{}[{}]", style(i + 1).dim(), style(k).yellow()))
            .collect();
        let _ = writeln!(out, "{}", tags.join(" "));
    }

    heading(&mut out, "분석 메트릭");
    out.push_str(&render_metrics(&MetricSummary::of(result)));
    out.push_str(&render_chart(&chart_series(&result.statistics)));

    let warnings = &result.validation.warnings;
    if !warnings.is_empty() {
        heading(&mut out, "검증 경고");
        for warning in warnings {
            let _ = writeln!(out, "  {} {}", style("!").yellow(), warning);
        }
    }

    if !result.key_sections.is_empty() {
        heading(&mut out, "주요 섹션");
        for section in &result.key_sections {
            out.push_str(&render_key_section(section));
        }
    }
    out
}

pub fn render_metrics(metrics: &MetricSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  평균 구조 점수  {:.3}", metrics.avg_structural_score);
    let _ = writeln!(out, "  최대 구조 점수  {:.3}", metrics.max_structural_score);
    let _ = writeln!(out, "  셀 타입 수      {}", metrics.distinct_cell_types);
    let _ = writeln!(
        out,
        "  유효성          {}",
        if metrics.is_valid { "✓" } else { "✗" }
    );
    out
}

/// Horizontal bars scaled to the larger of the two values (or 1.0).
pub fn render_chart(series: &[ChartPoint]) -> String {
    let scale = series
        .iter()
        .map(|p| p.value)
        .fold(1.0_f64, f64::max);
    let mut out = String::new();
    for point in series {
        let filled = ((point.value.max(0.0) / scale) * BAR_WIDTH as f64).round() as usize;
        let _ = writeln!(
            out,
            "  {:<6} {}{} {:.3}",
            point.label,
            style("█".repeat(filled)).blue(),
            " ".repeat(BAR_WIDTH.saturating_sub(filled)),
            point.value
        );
    }
    out
}

fn render_key_section(section: &KeySection) -> String {
    format!(
        "  {} (점수: {})\n    {}\n",
        style(&section.section_type).bold(),
        section.score,
        section.preview()
    )
}

/// Keyword detail modal.
pub fn render_modal(modal: &ModalView<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", RULE);
    let _ = writeln!(out, "{}", style(format!("\"{}\" 관련 내용", modal.keyword)).bold());
    match modal.lookup {
        KeywordLookup::NoRelatedContent => {
            let _ = writeln!(out, "{}", style(NO_RELATED_CONTENT).dim());
        }
        KeywordLookup::Found(locations) => {
            for location in locations {
                let _ = writeln!(
                    out,
                    "{}  관련도: {}%",
                    style(format!("섹션 {}", location.page_number)).cyan(),
                    location.relevance_percent()
                );
                let _ = writeln!(out, "  {}", location.content);
            }
        }
    }
    let _ = writeln!(out, "{}", RULE);
    out
}

/// History list with filter, error indicator and empty state.
pub fn render_history(browser: &HistoryBrowser) -> String {
    if browser.is_loading() {
        return format!("{}\n", style(LOADING_HISTORY).dim());
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", style("분석 이력").bold());
    if !browser.query().is_empty() {
        let _ = writeln!(out, "검색: {}", browser.query());
    }
    if let Some(err) = browser.error() {
        let _ = writeln!(out, "{} {}", style("!").red().bold(), style(err).red());
    }

    let visible = browser.visible();
    if visible.is_empty() {
        let _ = writeln!(out, "{}", NO_HISTORY);
        return out;
    }

    for (i, entry) in visible.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {}  {}",
            i + 1,
            style(&entry.file_name).bold(),
            style(entry.created_date()).dim()
        );
        let _ = writeln!(
            out,
            "     {} | {}페이지 | {}셀 | 구조 점수 {:.2}",
            entry.document_type,
            entry.total_pages,
            entry.total_cells,
            entry.avg_structural_score
        );
        if let Some(summary) = entry.summary_preview() {
            let _ = writeln!(out, "     {}", style(summary).dim());
        }
    }
    out
}
