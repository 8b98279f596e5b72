use std::error::Error;
use std::io::Read;
use std::path::PathBuf;

use brief_analyzer::{
    export_pdf, AnalysisClient, AnalysisResult, AnalyzerConfig, Brief, PresentationView,
    PromptBuilder, PromptOptions, ReportOptions, Tab, EXAMPLE_BRIEF,
};
use clap::{Args, Parser, Subcommand};

/// Analyze a client project brief with a chat-completion model
#[derive(Parser, Debug)]
#[command(name = "brief-analyzer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a brief and display the result
    Analyze(AnalyzeArgs),
    /// Render a previously saved result JSON as a PDF report
    Export {
        /// Result JSON produced by `analyze --json`
        input: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print the two prompt messages that would be sent for a brief
    Template {
        #[command(flatten)]
        brief: BriefArgs,
        /// Append the JSON Schema of the expected answer
        #[arg(long)]
        with_schema: bool,
    },
    /// Print the built-in example brief
    Example,
}

#[derive(Args, Debug)]
struct BriefArgs {
    /// Brief text
    #[arg(long, conflicts_with_all = ["file", "example"])]
    brief: Option<String>,
    /// Read the brief from a file ("-" for stdin)
    #[arg(long, conflicts_with = "example")]
    file: Option<PathBuf>,
    /// Use the built-in example brief
    #[arg(long)]
    example: bool,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Directory the PDF is written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// PDF file name, without extension
    #[arg(long, default_value = "brief-analysis")]
    name: String,
    /// Leave the charts out of the report
    #[arg(long)]
    no_charts: bool,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    #[command(flatten)]
    brief: BriefArgs,
    /// API credential (falls back to OPENAI_API_KEY / VITE_OPENAI_API_KEY)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Model identifier
    #[arg(long)]
    model: Option<String>,
    /// Chat-completion endpoint URL
    #[arg(long)]
    endpoint: Option<String>,
    /// Tab to print: analysis, questions, alternatives, structure, json, or all
    #[arg(long, default_value = "analysis")]
    tab: String,
    /// Also write a PDF report
    #[arg(long)]
    pdf: bool,
    /// Save the validated result JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,
    #[command(flatten)]
    output: OutputArgs,
}

fn read_brief(args: &BriefArgs) -> Result<String, Box<dyn Error>> {
    if args.example {
        return Ok(EXAMPLE_BRIEF.to_string());
    }
    if let Some(text) = &args.brief {
        return Ok(text.clone());
    }
    match &args.file {
        Some(path) if path.as_os_str() == "-" => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Err("provide --brief, --file or --example".into()),
    }
}

fn write_pdf(result: &AnalysisResult, output: &OutputArgs) -> Result<PathBuf, Box<dyn Error>> {
    let options = ReportOptions {
        file_name: output.name.clone(),
        include_charts: !output.no_charts,
        ..ReportOptions::default()
    };
    let bytes = export_pdf(result, &options).map_err(|e| e.user_message())?;
    let path = output.out_dir.join(format!("{}.pdf", options.file_name));
    std::fs::write(&path, bytes)?;
    Ok(path)
}

fn print_tabs(result: &AnalysisResult, tab: &str) -> Result<(), Box<dyn Error>> {
    let mut view = PresentationView::new(result);
    let tabs: Vec<Tab> = if tab.eq_ignore_ascii_case("all") {
        Tab::ALL.to_vec()
    } else {
        vec![tab.parse::<Tab>()?]
    };
    for tab in tabs {
        view.select(tab);
        println!("{}\n", view.tab_bar());
        println!("{}", view.render()?);
    }
    Ok(())
}

async fn analyze(args: AnalyzeArgs) -> Result<(), Box<dyn Error>> {
    let brief = read_brief(&args.brief)?;

    let mut config = AnalyzerConfig::from_env();
    if let Some(key) = args.api_key {
        config.api_key = Some(key);
    }
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }

    eprintln!("Analyse du brief en cours...");
    let client = AnalysisClient::openai(config);
    let result = client
        .analyze(&brief)
        .await
        .map_err(|e| e.user_message())?;

    print_tabs(&result, &args.tab)?;

    if let Some(path) = &args.json {
        std::fs::write(path, result.to_pretty_json()?)?;
        eprintln!("Résultat enregistré dans {}", path.display());
    }
    if args.pdf {
        let path = write_pdf(&result, &args.output)?;
        eprintln!("Rapport PDF écrit dans {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Analyze(args) => analyze(args).await,
        Command::Export { input, output } => {
            let text = std::fs::read_to_string(&input)?;
            let result = AnalysisResult::from_model_output(&text).map_err(|e| e.to_string())?;
            let path = write_pdf(&result, &output)?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Template { brief, with_schema } => {
            let brief = Brief::new(read_brief(&brief)?)?;
            let messages = PromptBuilder::new()
                .with_options(PromptOptions {
                    include_json_schema: with_schema,
                })
                .build(&brief);
            println!("{}", serde_json::to_string_pretty(&messages)?);
            Ok(())
        }
        Command::Example => {
            println!("{}", EXAMPLE_BRIEF);
            Ok(())
        }
    }
}
