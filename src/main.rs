use anyhow::Context;
use clap::{Parser, Subcommand};
use infomodel_gen::Result;
use infomodel_gen::builder::TreeBuilder;
use infomodel_gen::config::GeneratorConfig;
use infomodel_gen::device::ProtocolFamily;
use infomodel_gen::export;
use infomodel_gen::ids::IdAllocator;
use infomodel_gen::input;
use infomodel_gen::logging::{LogFormat, init_logging};
use infomodel_gen::render;
use infomodel_gen::tags::TagTable;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "infomodel-gen")]
#[command(about = "HMI information model generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,

    /// Default filter when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the information model and write the HMI documents.
    Generate {
        /// Generator config (devices, optional tag table).
        #[arg(long)]
        config: PathBuf,

        /// Information model rows (CSV).
        #[arg(long)]
        model: PathBuf,

        #[arg(long)]
        alarms: Option<PathBuf>,

        #[arg(long)]
        parameters: Option<PathBuf>,

        /// Tag template CSV; overrides the one named in the config.
        #[arg(long)]
        tags: Option<PathBuf>,

        /// Output directory.
        #[arg(short = 'o', long)]
        out: PathBuf,

        /// Also write the tree as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the tag template table (built-in unless a CSV is given).
    Tags {
        #[arg(long)]
        tags: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format);

    match cli.cmd {
        Commands::Generate {
            config,
            model,
            alarms,
            parameters,
            tags,
            out,
            json,
        } => {
            // 1) Configuration and lookup tables.
            let config = GeneratorConfig::load(&config)?;
            let table = config.tag_table(tags.as_deref())?;
            let templates = config.actuator_templates();

            // 2) Inputs.
            let rows = input::load_information_model(&model)?;
            let alarms = match alarms {
                Some(p) => input::load_alarms(p)?,
                None => Vec::new(),
            };
            let parameters = match parameters {
                Some(p) => input::load_parameters(p)?,
                None => Vec::new(),
            };

            // 3) Build.
            let builder = TreeBuilder::new(&table, &config.devices, &templates);
            let mut ids = IdAllocator::new();
            let output = builder.build_model(&rows, &alarms, &parameters, &mut ids)?;

            // 4) Render.
            std::fs::create_dir_all(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;

            let catalog = export::type_catalog(&output.tree);
            let alarm_nodes = export::alarm_list(&output.alarms);
            let translations = export::alarm_translations(&output.alarms);

            write_file(&out, render::MAIN_MODEL_FILE, &render::render_information_model(&output.tree)?)?;
            write_file(&out, render::PROJECT_TAGS_FILE, &render::render_project_tags(&catalog)?)?;
            write_file(&out, render::ALARM_LIST_FILE, &render::render_alarm_list(&alarm_nodes)?)?;
            write_file(
                &out,
                render::ALARM_TRANSLATION_FILE,
                &render::render_alarm_translations(&translations)?,
            )?;
            if json {
                write_file(&out, render::JSON_DUMP_FILE, &render::render_json(&output)?)?;
            }

            if !output.diagnostics.is_empty() {
                eprintln!("{} item(s) skipped:", output.diagnostics.len());
                for d in &output.diagnostics {
                    eprintln!("  {d}");
                }
            }
            println!("Wrote {} ({} ids)", out.display(), ids.issued());
        }
        Commands::Tags { tags } => {
            let table = match tags {
                Some(p) => TagTable::from_csv_path(&p)
                    .with_context(|| format!("failed to load tag table {}", p.display()))?,
                None => TagTable::builtin()?,
            };
            for (key, entry) in table.entries() {
                println!("{key}");
                for family in ProtocolFamily::ALL {
                    if let Some(f) = entry.formats.get(&family) {
                        println!("  {:<10} {:<8} {}", family.to_string(), f.data_type, f.format.source);
                    }
                }
            }
        }
    }

    Ok(())
}

fn write_file(dir: &Path, name: &str, contents: &str) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "written");
    Ok(())
}
