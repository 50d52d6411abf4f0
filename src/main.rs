use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tplhandlebars::{Engine, Settings};
use tracing_subscriber::{EnvFilter, fmt};

/// Render a template that uses {% verbatim %} / {% tplhandlebars %} blocks.
#[derive(Parser, Debug)]
#[command(name = "tplhandlebars", version)]
struct Cli {
    /// Template file to render
    template: PathBuf,

    /// JSON file used as the template context
    #[arg(long)]
    context: Option<PathBuf>,

    /// Override STATIC_URL
    #[arg(long)]
    static_url: Option<String>,

    /// Use Ember.js style attributes (data-template-name)
    #[arg(long)]
    ember: bool,
}

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::from_env();
    if let Some(url) = cli.static_url {
        settings = settings.static_url(url);
    }
    if cli.ember {
        settings = settings.use_ember_style_attrs(true);
    }

    let source = std::fs::read_to_string(&cli.template)
        .with_context(|| format!("failed to read template: {}", cli.template.display()))?;
    let context: serde_json::Value = match &cli.context {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read context: {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))?
        }
        None => serde_json::Value::Object(Default::default()),
    };

    let engine = Engine::new().with_settings(settings);
    let name = cli.template.display().to_string();
    let output = engine.render_template(&name, &source, &context)?;
    print!("{}", output);
    Ok(())
}
