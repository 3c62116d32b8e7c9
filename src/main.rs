use jobform::modules::events::apply_all;
use jobform::modules::markup::parse_form;
use jobform::modules::serialize::{load_events, load_form, load_selectors, save_form};
use jobform::modules::sources::MarkupSource;
use jobform::modules::submission::Submittable;
use jobform::modules::types::FormModel;
use std::error::Error;
use simplelog::*;
use std::fs::OpenOptions;
use log::info;
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "jobform",
    version,
    about = "Sync job form composer",
    long_about = include_str!("../help.txt")
)]
struct Cli {
    #[arg(short = 'l', long = "log-file", default_value = "jobform.log")]
    log_file: String,

    #[arg(short = 'm', long = "markup", conflicts_with = "form", help = "Rendered job form, file path or http(s) URL")]
    markup: Option<String>,

    #[arg(short = 'f', long = "form", help = "Saved form model (TOML)")]
    form: Option<String>,

    #[arg(short = 's', long = "selectors", help = "Selector overrides (TOML)")]
    selectors: Option<String>,

    #[arg(short = 'e', long = "events", default_value = "./events.toml")]
    events: String,

    #[arg(short = 'o', long = "out", default_value = "./form.toml")]
    out: String,
}

fn init_logger(log_path: &str) -> Result<(), Box<dyn Error>> {
    WriteLogger::init(
        LevelFilter::Info,
        ConfigBuilder::new()
            .set_time_format_rfc3339()
            .build(),
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?,
    )?;
    Ok(())
}

fn load_model(cli: &Cli) -> Result<FormModel, Box<dyn Error>> {
    if let Some(markup) = &cli.markup {
        let selectors = load_selectors(cli.selectors.as_deref())?;
        let html = MarkupSource::parse(markup).load()?;
        return parse_form(&html, &selectors);
    }
    match &cli.form {
        Some(path) => load_form(path),
        None => Err("either --markup or --form is required".into()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logger(&cli.log_file)?;

    let mut form = load_model(&cli)?;
    let events = load_events(&cli.events)?;
    info!("Applying {} events", events.len());
    apply_all(&mut form, &events);

    save_form(&cli.out, &form)?;
    info!("Saved form to {}", cli.out);

    for (name, value) in form.submission() {
        println!("{name}={value}");
    }
    Ok(())
}
