//! Command-line interface: web server, one-off prediction, dataset info and
//! the interactive terminal form.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::AppConfig;
use crate::data::{validate_schema, CarQuery, DataLoader, DatasetSummary};
use crate::form::{format_price, FieldKind, FormInput, FormSpec};
use crate::pipeline::{FittedPipeline, ModelStore};
use crate::preprocessing::UnknownCategoryPolicy;

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn bad(s: &str) -> ColoredString    { s.truecolor(235, 110, 100) }
fn price(s: &str) -> ColoredString  { s.truecolor(255, 87, 34).bold() }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    use std::io::Write;
    print!("  {} {}... ", accent("›"), msg);
    let _ = std::io::stdout().flush();
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "car-price")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Used-car resale price predictor")]
#[command(long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Historical dataset (CSV, TSV, Parquet, JSON or Excel)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Handling of categories absent from the dataset (error, ignore)
    #[arg(long, global = true)]
    pub unknown_category: Option<UnknownCategoryPolicy>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web form
    Serve {
        /// Server port
        #[arg(short, long)]
        port: Option<u16>,

        /// Server host
        #[arg(long)]
        host: Option<String>,

        /// Refit when the dataset file changes
        #[arg(long)]
        watch: bool,
    },

    /// Price one car
    Predict {
        #[arg(long)]
        city: String,

        #[arg(long)]
        fuel_type: String,

        #[arg(long)]
        body_type: String,

        #[arg(long)]
        transmission_type: String,

        /// 0 to 3
        #[arg(long, default_value_t = 0)]
        previous_owners: u8,

        /// 793 to 1896 cc
        #[arg(long)]
        engine_displacement: u32,

        /// 0 to 154931
        #[arg(long)]
        kilometers_driven: u32,

        /// 1985 to 2023
        #[arg(long)]
        year_of_manufacture: u32,
    },

    /// Show dataset and model information
    Info,

    /// Fill in the form in the terminal
    Form,
}

impl Cli {
    /// Defaults, config file, environment, then these flags
    pub fn resolve_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        if let Some(ref data) = self.data {
            config.data_path = data.clone();
        }
        if let Some(policy) = self.unknown_category {
            config.model.unknown_category = policy;
        }
        if let Some(Commands::Serve { port, ref host, watch }) = self.command {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host.clone();
            }
            config.watch_dataset |= watch;
        }
        config.validate()?;
        Ok(config)
    }
}

fn fit_with_progress(config: &AppConfig) -> anyhow::Result<ModelStore> {
    step_run(&format!("Fitting {} trees on {}", config.model.n_estimators, config.data_path.display()));
    let start = Instant::now();
    let store = ModelStore::load(&config.data_path, config.model.clone())?;
    step_done(&format!("{} rows, {:.1}s", store.current().summary().rows, start.elapsed().as_secs_f64()));

    let gaps = FormSpec::standard().audit(store.current().transformer().vocabularies());
    for gap in &gaps {
        println!("  {} {} option {:?} is not in the dataset", bad("!"), gap.column, gap.option);
    }
    Ok(store)
}

// ─── Predict ───────────────────────────────────────────────────────────────────

pub fn cmd_predict(config: &AppConfig, query: CarQuery) -> anyhow::Result<()> {
    FormSpec::standard().validate(&query)?;

    let pipeline = FittedPipeline::from_path(&config.data_path, &config.model)?;
    let value = pipeline.predict(&query)?;

    println!("{}", format_price(value, &config.currency_symbol));
    Ok(())
}

// ─── Info ──────────────────────────────────────────────────────────────────────

pub fn cmd_info(config: &AppConfig) -> anyhow::Result<()> {
    section("Dataset");

    let df = DataLoader::new().load_auto(&config.data_path)?;
    let summary = DatasetSummary::from_frame(&df);

    println!("  {:<12} {}", muted("File"), config.data_path.display());
    println!("  {:<12} {}", muted("Rows"), summary.rows);
    println!("  {:<12} {}", muted("Columns"), summary.columns.len());
    println!("  {:<12} {:.2} MB", muted("Memory"), summary.estimated_size_bytes as f64 / 1024.0 / 1024.0);
    println!();

    println!("  {:<22} {:<12} {:>6} {:>8}", muted("Column"), muted("Type"), muted("Nulls"), muted("Unique"));
    println!("  {}", dim(&"─".repeat(52)));
    for col in &summary.columns {
        println!(
            "  {:<22} {:<12} {:>6} {:>8}",
            col.name,
            col.dtype.as_str().truecolor(140, 140, 140),
            col.null_count,
            col.unique_count
        );
    }

    println!();
    if let Err(e) = validate_schema(&df) {
        println!("  {} {}", bad("✗"), e);
        println!();
        return Ok(());
    }
    println!("  {} {}", ok("✓"), "schema matches");

    section("Model");
    let pipeline = FittedPipeline::from_path(&config.data_path, &config.model)?;
    let model = pipeline.summary();

    println!("  {:<12} {}", muted("Trees"), model.n_estimators);
    println!("  {:<12} {}", muted("Seed"), model.random_state);
    println!("  {:<12} {}", muted("Features"), model.n_features_out);
    println!("  {:<12} {} ms", muted("Fit time"), model.fit_millis);
    if let Some(ref digest) = model.fingerprint {
        println!("  {:<12} {}", muted("SHA-256"), &digest[..16.min(digest.len())]);
    }
    if !model.dropped_columns.is_empty() {
        println!("  {:<12} {}", muted("Unused"), model.dropped_columns.join(", "));
    }

    section("Importance");
    for entry in &model.importances {
        let bar = "█".repeat((entry.importance * 40.0).round() as usize);
        println!("  {:<22} {:>6.3} {}", entry.column, entry.importance, accent(&bar));
    }

    section("Vocabulary");
    for vocab in &model.vocabularies {
        println!("  {:<22} {}", vocab.column, muted(&vocab.categories.join(", ")));
    }

    let gaps = FormSpec::standard().audit(&model.vocabularies);
    if !gaps.is_empty() {
        println!();
        for gap in &gaps {
            println!("  {} {} option {:?} is not in the dataset", bad("!"), gap.column, gap.option);
        }
    }

    println!();
    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(config: AppConfig) -> anyhow::Result<()> {
    use crate::server::run_server;

    let (host, port) = (config.host.clone(), config.port);
    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Car Price Predictor".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Form   ", &format!("http://{}:{}", host, port)));
    line_box(&kv("Health ", &format!("http://{}:{}/health", host, port)));
    line_box(&kv("Data   ", &config.data_path.display().to_string()));
    line_box_empty();
    line_box_bottom();
    println!();

    run_server(config).await
}

// ─── Terminal form ─────────────────────────────────────────────────────────────

fn theme() -> dialoguer::theme::ColorfulTheme {
    use dialoguer::console::{style, Style};

    dialoguer::theme::ColorfulTheme {
        active_item_prefix: style("  ›".to_string()).for_stderr().cyan(),
        active_item_style: Style::new().for_stderr().white().bold(),
        inactive_item_prefix: style("   ".to_string()).for_stderr(),
        inactive_item_style: Style::new().for_stderr().color256(245),
        prompt_prefix: style("  ?".to_string()).for_stderr().color256(111),
        prompt_style: Style::new().for_stderr().white().bold(),
        ..dialoguer::theme::ColorfulTheme::default()
    }
}

/// Ask for every field, starting from `previous`
fn ask_query(spec: &FormSpec, previous: &CarQuery) -> anyhow::Result<CarQuery> {
    use dialoguer::{Input, Select};

    let theme = theme();
    let mut input = FormInput::from_query(previous);

    for field in spec.fields() {
        let current = field.id.value_of(previous);
        match field.kind {
            FieldKind::Select(options) | FieldKind::Radio(options) => {
                let default = options.iter().position(|o| *o == current).unwrap_or(0);
                let idx = Select::with_theme(&theme)
                    .with_prompt(field.id.label())
                    .items(options)
                    .default(default)
                    .interact()?;
                input.set(field.id, options[idx].clone());
            }
            FieldKind::Number(range) => {
                let value: u32 = Input::with_theme(&theme)
                    .with_prompt(format!("{} [{}-{}]", field.id.label(), range.min, range.max))
                    .default(current.parse().unwrap_or(range.default))
                    .validate_with(|v: &u32| {
                        if range.contains(*v) {
                            Ok(())
                        } else {
                            Err(format!("must be between {} and {}", range.min, range.max))
                        }
                    })
                    .interact_text()?;
                input.set(field.id, value.to_string());
            }
            FieldKind::Fixed(value) => {
                println!("  {} {}", muted(&format!("{} (Fixed to {}):", field.id.label(), value)), value);
            }
        }
    }

    Ok(input.into_query(spec))
}

pub fn cmd_form(config: &AppConfig) -> anyhow::Result<()> {
    use dialoguer::Confirm;

    section("Find the Best Price for Your Car");
    let store = fit_with_progress(config)?;
    let spec = FormSpec::standard();
    let mut query = spec.default_query();

    loop {
        println!();
        query = ask_query(&spec, &query)?;

        match store.predict(&query) {
            Ok(value) => {
                let text = format!("Predicted Car Price: {}", format_price(value, &config.currency_symbol));
                println!();
                println!("  {}", price(&text));
            }
            Err(e) => {
                println!();
                println!("  {} {}", bad("✗"), e);
            }
        }

        println!();
        let again = Confirm::with_theme(&theme())
            .with_prompt("Price another car")
            .default(true)
            .interact()?;
        if !again {
            break;
        }
    }

    println!();
    Ok(())
}

// ─── Interactive mode ──────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("       {}", "Car Price Predictor".truecolor(120, 170, 255).bold());
    println!("       {}", dim(&format!("used-car resale estimates  ·  v{}", env!("CARGO_PKG_VERSION"))));
    println!();
}

pub async fn cmd_interactive(config: AppConfig) -> anyhow::Result<()> {
    use dialoguer::Select;

    print_banner();
    let theme = theme();

    loop {
        let serve_item = format!("Start Server          web form on :{}", config.port);
        let items = [
            "Price a Car           terminal form",
            serve_item.as_str(),
            "Dataset Info          columns, model, vocabulary",
            "Exit",
        ];

        println!();
        let sel = Select::with_theme(&theme)
            .with_prompt("What would you like to do")
            .items(&items)
            .default(0)
            .interact_opt()?;

        match sel {
            Some(0) => cmd_form(&config)?,
            Some(1) => {
                cmd_serve(config.clone()).await?;
                break;
            }
            Some(2) => {
                if let Err(e) = cmd_info(&config) {
                    println!("  {} {}", bad("✗"), e);
                }
            }
            _ => {
                println!();
                println!("  {}", dim("goodbye"));
                println!();
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi() {
        let colored = format!("{}", "₹1,000".red());
        assert_eq!(strip_ansi(&colored), "₹1,000");
    }

    #[test]
    fn test_parse_predict() {
        let cli = Cli::try_parse_from([
            "car-price",
            "--unknown-category",
            "ignore",
            "predict",
            "--city",
            "Delhi",
            "--fuel-type",
            "Petrol",
            "--body-type",
            "Sedan",
            "--transmission-type",
            "Manual",
            "--engine-displacement",
            "1200",
            "--kilometers-driven",
            "20000",
            "--year-of-manufacture",
            "2015",
        ])
        .unwrap();

        assert_eq!(cli.unknown_category, Some(UnknownCategoryPolicy::Ignore));
        match cli.command {
            Some(Commands::Predict { ref city, previous_owners, .. }) => {
                assert_eq!(city, "Delhi");
                assert_eq!(previous_owners, 0);
            }
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn test_serve_flags_override_config() {
        let cli = Cli::try_parse_from(["car-price", "--data", "cars.xlsx", "serve", "-p", "9999", "--watch"]).unwrap();
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.port, 9999);
        assert!(config.watch_dataset);
        assert_eq!(config.data_path, PathBuf::from("cars.xlsx"));
    }
}
