use brief_analyzer::{
    AnalysisClient, AnalysisSession, AnalyzerConfig, MemoryClipboard, ReportOptions, Tab,
};
use dotenv::dotenv;
use std::error::Error;
use std::path::Path;
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    println!("🚀 Starting brief analysis example...");

    // 1. Credential and endpoint come from OPENAI_API_KEY / BRIEF_ANALYZER_* variables
    let config = AnalyzerConfig::from_env();
    if config.credential().is_err() {
        eprintln!("❌ Set OPENAI_API_KEY in the environment or a .env file");
        return Ok(());
    }
    println!("🤖 Model: {} at {}", config.model, config.endpoint);

    // 2. Load the built-in example brief and submit it
    let mut session = AnalysisSession::new(AnalysisClient::openai(config));
    session.use_example();
    println!("📋 Brief loaded ({} characters)", session.brief().len());

    println!("📤 Sending brief to the model...");
    let outcome = session.submit().await.map(|_| ());
    if let Err(e) = outcome {
        eprintln!("❌ {}", session.error().unwrap_or("analysis failed"));
        return Err(e.into());
    }
    println!("📥 Received a valid analysis.");

    // 3. Print every tab
    if let Some(mut view) = session.view() {
        for tab in Tab::ALL {
            view.select(tab);
            println!("\n{}\n", view.tab_bar());
            println!("{}", view.render()?);
        }

        let mut clipboard = MemoryClipboard::default();
        view.copy_json(&mut clipboard, Instant::now())?;
        let copied = clipboard.contents.map(|c| c.len()).unwrap_or(0);
        println!("📎 {} ({} bytes)", view.copy_label(Instant::now()), copied);
    }

    // 4. Export the PDF report
    let doc = session.export(&ReportOptions::default())?;
    let path = doc.save(Path::new("."))?;
    println!("💾 Report written to {} ({} pages)", path.display(), doc.page_count());

    Ok(())
}
