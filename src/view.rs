//! Tabbed text presentation of a validated result.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::{AnalysisResult, Approach};

/// How long the copy control shows its acknowledgment.
pub const COPIED_ACK: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Analysis,
    Questions,
    Alternatives,
    Structure,
    Json,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Analysis,
        Tab::Questions,
        Tab::Alternatives,
        Tab::Structure,
        Tab::Json,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Analysis => "Analyse",
            Tab::Questions => "Questions",
            Tab::Alternatives => "Alternatives",
            Tab::Structure => "Structure projet",
            Tab::Json => "JSON complet",
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Tab::Analysis => "analysis",
            Tab::Questions => "questions",
            Tab::Alternatives => "alternatives",
            Tab::Structure => "structure",
            Tab::Json => "json",
        }
    }
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|t| t.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown tab '{}'", s))
    }
}

/// Hours as the model gave them: `5h`, `12.25h`.
pub fn format_hours(hours: f64) -> String {
    format!("{}h", hours)
}

/// Destination for the "copy JSON" action.
///
/// The crate ships no system clipboard backend. An embedding UI implements this
/// over its own clipboard; `MemoryClipboard` serves tests and headless callers.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

pub struct PresentationView<'a> {
    result: &'a AnalysisResult,
    active: Tab,
    copied_at: Option<Instant>,
}

impl<'a> PresentationView<'a> {
    pub fn new(result: &'a AnalysisResult) -> Self {
        Self {
            result,
            active: Tab::Analysis,
            copied_at: None,
        }
    }

    pub fn active_tab(&self) -> Tab {
        self.active
    }

    pub fn select(&mut self, tab: Tab) {
        self.active = tab;
    }

    pub fn render(&self) -> Result<String> {
        self.render_tab(self.active)
    }

    pub fn render_tab(&self, tab: Tab) -> Result<String> {
        Ok(match tab {
            Tab::Analysis => self.render_analysis(),
            Tab::Questions => self.render_questions(),
            Tab::Alternatives => self.render_alternatives(),
            Tab::Structure => self.render_structure(),
            Tab::Json => self.result.to_pretty_json()?,
        })
    }

    /// Copy the pretty-printed result and start the acknowledgment window.
    pub fn copy_json(&mut self, clipboard: &mut dyn Clipboard, now: Instant) -> Result<()> {
        clipboard.write_text(&self.result.to_pretty_json()?)?;
        self.copied_at = Some(now);
        Ok(())
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.copied_at
            .map(|at| now.saturating_duration_since(at) < COPIED_ACK)
            .unwrap_or(false)
    }

    pub fn copy_label(&self, now: Instant) -> &'static str {
        if self.is_copied(now) {
            "Copié !"
        } else {
            "Copier"
        }
    }

    /// Tab bar with the active tab bracketed.
    pub fn tab_bar(&self) -> String {
        Tab::ALL
            .iter()
            .map(|t| {
                if *t == self.active {
                    format!("[{}]", t.label())
                } else {
                    t.label().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn render_analysis(&self) -> String {
        let a = &self.result.analysis;
        let mut out = String::new();
        for (title, items) in [
            ("Forces", &a.strengths),
            ("Faiblesses", &a.weaknesses),
            ("Informations manquantes", &a.missing_information),
        ] {
            let _ = writeln!(out, "{}", title);
            for item in items {
                let _ = writeln!(out, "  • {}", item);
            }
            out.push('\n');
        }
        let _ = writeln!(out, "Score de cohérence: {}", a.coherence_score.display());
        let _ = writeln!(out, "Score de complétude: {}", a.completeness_score.display());
        out
    }

    fn render_questions(&self) -> String {
        let mut out = String::from("Questions de clarification\n\n");
        for q in &self.result.clarification_questions {
            let _ = writeln!(out, "{} [{}] [{}]", q.question, q.importance, q.category);
            let _ = writeln!(out, "    {}", q.reason);
        }
        out
    }

    fn render_approaches(out: &mut String, title: &str, approaches: &[Approach]) {
        let _ = writeln!(out, "{}\n", title);
        for approach in approaches {
            let _ = writeln!(out, "{}", approach.title);
            let _ = writeln!(out, "  {}", approach.description);
            let _ = writeln!(out, "  Avantages");
            for b in &approach.benefits {
                let _ = writeln!(out, "    • {}", b);
            }
            let _ = writeln!(out, "  Considérations");
            for c in &approach.considerations {
                let _ = writeln!(out, "    • {}", c);
            }
            out.push('\n');
        }
    }

    fn render_alternatives(&self) -> String {
        let mut out = String::new();
        let views = &self.result.alternative_views;
        Self::render_approaches(&mut out, "Approches fonctionnelles", &views.functional_approaches);
        Self::render_approaches(&mut out, "Approches techniques", &views.technical_approaches);
        out
    }

    fn render_structure(&self) -> String {
        let s = &self.result.project_structure;
        let mut out = String::from("Structure du projet\n");
        let _ = writeln!(
            out,
            "Heures estimées: {}    Taille d'équipe recommandée: {} personnes\n",
            format_hours(s.estimated_total_hours),
            s.recommended_team_size
        );

        for (i, phase) in s.phases.iter().enumerate() {
            let _ = writeln!(out, "Phase {}: {}", i + 1, phase.name);
            let _ = writeln!(out, "  Objectifs");
            for o in &phase.objectives {
                let _ = writeln!(out, "    • {}", o);
            }
            let _ = writeln!(out, "  Livrables");
            for d in &phase.deliverables {
                let _ = writeln!(out, "    • {}", d);
            }
            let _ = writeln!(out, "  Tâches");
            let _ = writeln!(out, "    Nom | Heures | Priorité | Dépendances");
            for t in &phase.tasks {
                let _ = writeln!(
                    out,
                    "    {} | {} | {} | {}",
                    t.name,
                    format_hours(t.estimated_hours),
                    t.priority,
                    t.dependencies.join(", ")
                );
            }
            out.push('\n');
        }
        out
    }
}
