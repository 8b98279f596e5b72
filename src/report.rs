//! Turns an `AnalysisResult` into a paginated `ReportDocument`.

use chrono::{DateTime, Local};
use log::{info, warn};

use crate::error::{BriefAnalyzerError, Result};
use crate::layout::chart;
use crate::layout::{Font, LayoutConfig, LayoutEngine, ReportDocument, Rgb, TextStyle};
use crate::schema::{AnalysisResult, Approach, Phase};
use crate::view::format_hours;

pub const DEFAULT_FILE_NAME: &str = "brief-analysis";
pub const DEFAULT_TITLE: &str = "Analyse de Brief Client";

const TITLE: TextStyle = TextStyle::new(Font::bold(20.0), Rgb::INK, 0.0, 7.0);
const DATE: TextStyle = TextStyle::new(Font::regular(10.0), Rgb::GREY, 0.0, 8.0);
const SECTION: TextStyle = TextStyle::new(Font::bold(16.0), Rgb::BLUE, 0.0, 10.0);
const LEAD: TextStyle = TextStyle::new(Font::regular(12.0), Rgb::INK, 5.0, 7.0);
const ITEM: TextStyle = TextStyle::new(Font::regular(11.0), Rgb::INK, 5.0, 7.0);
const CAPTION: TextStyle = TextStyle::new(Font::regular(9.0), Rgb::GREY, 5.0, 5.0);
const QUESTION: TextStyle = TextStyle::new(Font::bold(12.0), Rgb::BLACK, 5.0, 5.5);
const QUESTION_META: TextStyle = TextStyle::new(Font::regular(10.0), Rgb::GREY, 10.0, 5.0);
const QUESTION_REASON: TextStyle = TextStyle::new(Font::regular(10.0), Rgb::GREY, 10.0, 5.0);
const APPROACH_TITLE: TextStyle = TextStyle::new(Font::bold(12.0), Rgb::BLUE, 5.0, 7.0);
const APPROACH_TEXT: TextStyle = TextStyle::new(Font::regular(11.0), Rgb::INK, 5.0, 6.0);
const LABEL: TextStyle = TextStyle::new(Font::bold(12.0), Rgb::INK, 5.0, 7.0);
const PHASE_ITEM: TextStyle = TextStyle::new(Font::regular(11.0), Rgb::INK, 10.0, 6.0);

const RADAR_SIZE_MM: f64 = 70.0;
const BAR_WIDTH_MM: f64 = 150.0;
const BAR_HEIGHT_MM: f64 = 75.0;

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub title: String,
    /// Download name, without extension.
    pub file_name: String,
    pub generated_at: DateTime<Local>,
    pub layout: LayoutConfig,
    pub include_charts: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            generated_at: Local::now(),
            layout: LayoutConfig::default(),
            include_charts: true,
        }
    }
}

fn sub_heading(color: Rgb) -> TextStyle {
    TextStyle::new(Font::bold(14.0), color, 0.0, 7.0)
}

/// Sections open on a fresh page; their title only repeats on continuation pages.
fn section(engine: &mut LayoutEngine, title: &str, first: bool) {
    if !first {
        engine.clear_running_title();
        engine.new_page();
    }
    engine.set_running_title(title);
    engine.heading(title, SECTION, ITEM.line_height);
}

fn bullet_list(engine: &mut LayoutEngine, items: &[String], style: TextStyle, marker: Rgb) {
    if items.is_empty() {
        engine.paragraph("Aucun element.", TextStyle { color: Rgb::GREY, ..style });
        return;
    }
    for item in items {
        engine.bullet(item, style, marker);
    }
}

fn analysis_section(
    engine: &mut LayoutEngine,
    result: &AnalysisResult,
    options: &ReportOptions,
) -> Result<()> {
    let analysis = &result.analysis;
    section(engine, "Analyse du brief", true);

    engine.paragraph(
        &format!("Score de cohérence: {}", analysis.coherence_score.display()),
        LEAD,
    );
    engine.paragraph(
        &format!("Score de complétude: {}", analysis.completeness_score.display()),
        LEAD,
    );

    if options.include_charts {
        let radar = chart::render_score_radar(&[
            analysis.coherence_score.value(),
            analysis.completeness_score.value(),
        ])?;
        engine.advance(2.0);
        engine.image(radar, RADAR_SIZE_MM, RADAR_SIZE_MM, LEAD.indent);
        engine.paragraph(
            "Axe haut: cohérence - axe bas: complétude (échelle 0 a 10)",
            CAPTION,
        );
    }
    engine.advance(3.0);

    let groups: [(&str, &[String], Rgb); 3] = [
        ("Forces:", &analysis.strengths, Rgb::GREEN),
        ("Faiblesses:", &analysis.weaknesses, Rgb::RED),
        ("Informations manquantes:", &analysis.missing_information, Rgb::ORANGE),
    ];
    for (title, items, color) in groups {
        engine.heading(title, sub_heading(color), ITEM.line_height);
        bullet_list(engine, items, ITEM, color);
        engine.advance(3.0);
    }
    Ok(())
}

fn questions_section(engine: &mut LayoutEngine, result: &AnalysisResult) {
    section(engine, "Questions de clarification", false);

    if result.clarification_questions.is_empty() {
        engine.paragraph("Aucune question de clarification.", ITEM);
        return;
    }

    for (index, question) in result.clarification_questions.iter().enumerate() {
        let title = format!("{}. {}", index + 1, question.question);
        let meta = format!(
            "Importance: {} | Catégorie: {}",
            question.importance, question.category
        );
        let block = engine.measure(&title, &QUESTION, false)
            + engine.measure(&meta, &QUESTION_META, false)
            + engine.measure(&question.reason, &QUESTION_REASON, false);

        // keep a question with its metadata and reason when it fits on a page
        if block <= engine.config().usable_height() {
            engine.ensure_space(block);
        }
        engine.paragraph(&title, QUESTION);
        let meta_style = TextStyle {
            color: Rgb::from_tuple(question.importance.rgb()),
            ..QUESTION_META
        };
        engine.paragraph(&meta, meta_style);
        engine.paragraph(&question.reason, QUESTION_REASON);
        engine.advance(5.0);
    }
}

fn approach_block(engine: &mut LayoutEngine, approach: &Approach) {
    engine.heading(&approach.title, APPROACH_TITLE, APPROACH_TEXT.line_height);
    engine.paragraph(&approach.description, APPROACH_TEXT);
    engine.heading("Avantages:", LABEL, PHASE_ITEM.line_height);
    bullet_list(engine, &approach.benefits, PHASE_ITEM, Rgb::GREEN);
    engine.heading("Considérations:", LABEL, PHASE_ITEM.line_height);
    bullet_list(engine, &approach.considerations, PHASE_ITEM, Rgb::ORANGE);
    engine.advance(5.0);
}

fn alternatives_section(engine: &mut LayoutEngine, result: &AnalysisResult) {
    section(engine, "Approches alternatives", false);
    let views = &result.alternative_views;
    let groups = [
        ("Approches fonctionnelles", &views.functional_approaches),
        ("Approches techniques", &views.technical_approaches),
    ];
    for (title, approaches) in groups {
        engine.heading(title, sub_heading(Rgb::INK), APPROACH_TITLE.line_height);
        if approaches.is_empty() {
            engine.paragraph("Aucune approche proposée.", ITEM);
        }
        for approach in approaches.iter() {
            approach_block(engine, approach);
        }
        engine.advance(3.0);
    }
}

fn phase_block(engine: &mut LayoutEngine, index: usize, phase: &Phase) {
    engine.heading(
        &format!("Phase {}: {}", index + 1, phase.name),
        sub_heading(Rgb::BLUE),
        LABEL.line_height + PHASE_ITEM.line_height,
    );

    engine.heading("Objectifs:", LABEL, PHASE_ITEM.line_height);
    bullet_list(engine, &phase.objectives, PHASE_ITEM, Rgb::BLUE);
    engine.advance(3.0);

    engine.heading("Livrables:", LABEL, PHASE_ITEM.line_height);
    bullet_list(engine, &phase.deliverables, PHASE_ITEM, Rgb::BLUE);
    engine.advance(3.0);

    engine.heading("Tâches principales:", LABEL, PHASE_ITEM.line_height);
    if phase.tasks.is_empty() {
        engine.paragraph("Aucune tâche.", PHASE_ITEM);
    }
    for task in &phase.tasks {
        let mut line = format!("{} ({})", task.name, format_hours(task.estimated_hours));
        if !task.dependencies.is_empty() {
            line.push_str(&format!(" - dépend de: {}", task.dependencies.join(", ")));
        }
        engine.bullet(&line, PHASE_ITEM, Rgb::from_tuple(task.priority.rgb()));
    }
    engine.advance(10.0);
}

fn structure_section(
    engine: &mut LayoutEngine,
    result: &AnalysisResult,
    options: &ReportOptions,
) -> Result<()> {
    let structure = &result.project_structure;
    section(engine, "Structure du projet", false);

    engine.paragraph(
        &format!(
            "Heures estimées: {}",
            format_hours(structure.estimated_total_hours)
        ),
        LEAD,
    );
    engine.paragraph(
        &format!(
            "Équipe recommandée: {} personnes",
            structure.recommended_team_size
        ),
        LEAD,
    );
    engine.advance(3.0);

    let phase_hours = structure.phase_hours();
    let summed: f64 = phase_hours.iter().map(|(_, h)| h).sum();
    if (summed - structure.estimated_total_hours).abs() > 0.5 {
        warn!(
            "Task hours sum to {} but the model estimated {} in total",
            summed, structure.estimated_total_hours
        );
    }

    if options.include_charts && !phase_hours.is_empty() {
        let values: Vec<f64> = phase_hours.iter().map(|(_, h)| *h).collect();
        let bars = chart::render_phase_hours(&values)?;
        engine.image(bars, BAR_WIDTH_MM, BAR_HEIGHT_MM, LEAD.indent);
        engine.paragraph("Heures par phase (de gauche a droite):", CAPTION);
        for (i, (name, hours)) in phase_hours.iter().enumerate() {
            engine.paragraph(
                &format!("P{} - {}: {}", i + 1, name, format_hours(*hours)),
                CAPTION,
            );
        }
        engine.advance(5.0);
    }

    for (index, phase) in structure.phases.iter().enumerate() {
        phase_block(engine, index, phase);
    }
    Ok(())
}

/// Lay out the full report. Nothing is returned unless every section succeeded.
pub fn build_report(result: &AnalysisResult, options: &ReportOptions) -> Result<ReportDocument> {
    let mut engine = LayoutEngine::new(options.layout);

    engine.centered(&options.title, TITLE);
    engine.centered(
        &format!(
            "Généré le {}",
            options.generated_at.format("%d/%m/%Y %H:%M")
        ),
        DATE,
    );
    engine.advance(5.0);

    analysis_section(&mut engine, result, options)?;
    questions_section(&mut engine, result);
    alternatives_section(&mut engine, result);
    structure_section(&mut engine, result, options)?;

    let doc = engine.finish(options.title.clone(), options.file_name.clone());
    info!("Report laid out on {} pages", doc.page_count());
    Ok(doc)
}

/// Build and serialize in one step; any failure is reported as `ExportFailure`.
pub fn export_pdf(result: &AnalysisResult, options: &ReportOptions) -> Result<Vec<u8>> {
    build_report(result, options)
        .and_then(|doc| doc.to_pdf_bytes())
        .map_err(|e| match e {
            BriefAnalyzerError::ExportFailure(_) => e,
            other => BriefAnalyzerError::ExportFailure(other.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{minimal_result, rich_result};
    use chrono::TimeZone;

    fn options() -> ReportOptions {
        ReportOptions {
            generated_at: Local.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap(),
            ..ReportOptions::default()
        }
    }

    #[test]
    fn test_minimal_report_has_all_sections() {
        let doc = build_report(&minimal_result(), &options()).unwrap();
        assert!(doc.page_count() >= 2);
        assert_eq!(doc.file_name, "brief-analysis");
        for needle in [
            "Analyse de Brief Client",
            "Genere le 05/03/2024 14:30",
            "Score de coherence: 8.0/10",
            "Questions de clarification",
            "Structure du projet",
            "Heures estimees: 5h",
            "Equipe recommandee: 1 personnes",
            "Phase 1: Build",
            "Code (5h)",
        ] {
            assert!(doc.contains_text(needle), "missing {:?}", needle);
        }
        assert_eq!(doc.images.len(), 2);
    }

    #[test]
    fn test_sections_start_on_new_pages() {
        let doc = build_report(&minimal_result(), &options()).unwrap();
        let texts = doc.page_texts();
        assert!(texts[0].iter().any(|t| t == "Analyse du brief"));
        let questions_page = texts
            .iter()
            .position(|p| p.iter().any(|t| t == "Questions de clarification"))
            .unwrap();
        assert!(questions_page >= 1);
        let page = &texts[questions_page];
        assert_eq!(
            page.iter().filter(|t| *t == "Questions de clarification").count(),
            1
        );
        assert!(!page.iter().any(|t| t == "Analyse du brief"));
    }

    #[test]
    fn test_running_header_on_continuation_pages_only() {
        let doc = build_report(&rich_result(40), &options()).unwrap();
        let texts = doc.page_texts();
        let first = texts
            .iter()
            .position(|p| p.iter().any(|t| t == "Structure du projet"))
            .unwrap();
        assert_eq!(
            texts[first].iter().filter(|t| *t == "Structure du projet").count(),
            1
        );
        assert!(texts[first + 1].iter().any(|t| t == "Structure du projet"));
    }

    #[test]
    fn test_charts_can_be_disabled() {
        let opts = ReportOptions {
            include_charts: false,
            ..options()
        };
        let doc = build_report(&minimal_result(), &opts).unwrap();
        assert!(doc.images.is_empty());
    }

    #[test]
    fn test_long_content_paginates_without_overflow() {
        let result = rich_result(40);
        let opts = options();
        let doc = build_report(&result, &opts).unwrap();
        assert!(doc.page_count() > 4);
        for page in &doc.pages {
            for cmd in &page.commands {
                if let crate::layout::DrawCommand::Text { y, text, .. } = cmd {
                    if !text.starts_with("Page ") {
                        assert!(*y <= opts.layout.overflow_threshold, "{} at {}", text, y);
                    }
                }
            }
        }
    }

    #[test]
    fn test_accents_are_folded() {
        let doc = build_report(&rich_result(2), &options()).unwrap();
        for page in doc.page_texts() {
            for text in page {
                assert!(text.is_ascii(), "non-ascii text {:?}", text);
            }
        }
    }

    #[test]
    fn test_export_pdf_bytes() {
        let bytes = export_pdf(&minimal_result(), &options()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
    }
}
