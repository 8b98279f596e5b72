//! # Brief Analyzer
//!
//! Sends a free-text client project brief to a chat-completion model with a fixed
//! prompt template, validates the JSON answer against a strict schema, and presents
//! the result as tabbed text views or a paginated PDF report with charts.
//!
//! ## Flow
//!
//! - **PromptBuilder** (`llm::prompts`): system instruction + brief + empty answer skeleton.
//! - **AnalysisClient** (`llm::client`): one POST, HTTP status mapping, strict parse.
//! - **ResponseSchema** (`schema`): `AnalysisResult`; scores normalized on ingestion.
//! - **PresentationView** (`view`): five tabs and the copy-JSON action.
//! - **ReportLayoutEngine** (`layout`, `report`): page-break policy, charts, PDF bytes.
//!
//! ## Example
//!
//! ```rust,ignore
//! use brief_analyzer::*;
//!
//! let config = AnalyzerConfig::from_env();
//! let client = AnalysisClient::openai(config);
//! let mut session = AnalysisSession::new(client);
//! session.set_brief("Build a todo app");
//! session.submit().await?;
//!
//! let doc = session.export(&ReportOptions::default())?;
//! doc.save(std::path::Path::new("."))?;
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod llm;
pub mod report;
pub mod schema;
pub mod transliterate;
pub mod view;

#[cfg(feature = "openai")]
pub use llm::ReqwestTransport;
pub use llm::{AnalysisClient, CompletionTransport, HttpResponse};
pub use config::AnalyzerConfig;
pub use error::{BriefAnalyzerError, Result};
pub use layout::{LayoutConfig, LayoutEngine, ReportDocument};
pub use llm::{Brief, ChatMessage, PromptBuilder, PromptOptions, Role, EXAMPLE_BRIEF};
pub use report::{build_report, export_pdf, ReportOptions};
pub use schema::*;
pub use view::{Clipboard, MemoryClipboard, PresentationView, Tab};

use log::info;

/// Interactive state around one client: the current brief, the last result and
/// the last error message.
///
/// `submit` takes `&mut self`, so a second analysis cannot start while one is in
/// flight. A new submission discards the previous result before sending.
pub struct AnalysisSession<T> {
    client: AnalysisClient<T>,
    brief: String,
    result: Option<AnalysisResult>,
    error: Option<String>,
}

impl<T: CompletionTransport> AnalysisSession<T> {
    pub fn new(client: AnalysisClient<T>) -> Self {
        Self {
            client,
            brief: String::new(),
            result: None,
            error: None,
        }
    }

    pub fn set_brief(&mut self, text: impl Into<String>) {
        self.brief = text.into();
    }

    pub fn use_example(&mut self) {
        self.brief = EXAMPLE_BRIEF.to_string();
    }

    pub fn brief(&self) -> &str {
        &self.brief
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// Human-readable message for the last failure, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn view(&self) -> Option<PresentationView<'_>> {
        self.result.as_ref().map(PresentationView::new)
    }

    pub async fn submit(&mut self) -> Result<&AnalysisResult> {
        self.result = None;
        self.error = None;

        match self.client.analyze(&self.brief).await {
            Ok(result) => {
                info!("Brief analysis stored in session");
                Ok(&*self.result.insert(result))
            }
            Err(e) => {
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Lay out the current result as a report.
    pub fn export(&mut self, options: &ReportOptions) -> Result<ReportDocument> {
        let outcome = match &self.result {
            Some(result) => build_report(result, options),
            None => Err(BriefAnalyzerError::ExportFailure(
                "no analysis to export".to_string(),
            )),
        };
        outcome.map_err(|e| {
            let e = match e {
                BriefAnalyzerError::ExportFailure(_) => e,
                other => BriefAnalyzerError::ExportFailure(other.to_string()),
            };
            self.error = Some(e.user_message());
            e
        })
    }
}
