//! Curriculum import CLI - spreadsheets to module/lesson payloads
//!
//! ```bash
//! curriculum-import import "Frente A.xlsx" --course c-1   # Build upsert payload
//! curriculum-import inspect aulas.csv                     # Show columns and template
//! curriculum-import template -o modelo.csv                # Write the import template
//! curriculum-import serve                                 # Start HTTP server (port 3000)
//! ```

use clap::{Parser, Subcommand};
use curriculum_import::{import_file, inspect_bytes, template_csv, AppConfig, TemplateKind};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "curriculum-import")]
#[command(about = "Import course modules and lessons from CSV/XLSX spreadsheets")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: spreadsheet → upsert payload JSON
    Import {
        /// Input CSV/XLSX file
        input: PathBuf,

        /// Target course id
        #[arg(short, long)]
        course: Option<String>,

        /// Discipline (checked against the file's column)
        #[arg(short, long)]
        discipline: Option<String>,

        /// Front (checked against the file's column)
        #[arg(short, long)]
        front: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write lessons grouped by module
        #[arg(short, long)]
        grouped: Option<PathBuf>,

        /// Number of lessons echoed to the log
        #[arg(long)]
        preview_rows: Option<usize>,

        /// Skip payload schema validation
        #[arg(long)]
        no_validate: bool,
    },

    /// Show detected encoding, columns and template
    Inspect {
        /// Input CSV/XLSX file
        input: PathBuf,
    },

    /// Write the import template CSV
    Template {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: CURRICULUM_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match AppConfig::from_env() {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Import {
            input,
            course,
            discipline,
            front,
            output,
            grouped,
            preview_rows,
            no_validate,
        } => {
            let mut options = config.import_options();
            options.course_id = course;
            options.discipline = discipline;
            options.front = front;
            options.skip_payload_validation = no_validate;
            if let Some(rows) = preview_rows {
                options.log_preview_rows = rows;
            }
            cmd_import(&input, options, output.as_deref(), grouped.as_deref())
        }

        Commands::Inspect { input } => cmd_inspect(&input, &config),

        Commands::Template { output } => write_output(&template_csv(), output.as_deref()),

        Commands::Serve { port } => {
            let config = AppConfig {
                port: port.unwrap_or(config.port),
                ..config
            };
            curriculum_import::server::start_server(config).await
        }
    }
}

fn cmd_import(
    input: &Path,
    options: curriculum_import::ImportOptions,
    output: Option<&Path>,
    grouped_output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let report = import_file(input, &options)?;

    eprintln!(
        "\n⚙️  Built {} lessons in {} modules",
        report.payload.content.len(),
        report.modules.len()
    );
    for module in &report.modules {
        eprintln!(
            "   {:>3}. {} ({} aulas, {} min)",
            module.module.number,
            module.module.name,
            module.lessons.len(),
            module.total_minutes
        );
    }

    if !report.skipped.is_empty() {
        eprintln!("\n⚠️  {} rows skipped:", report.skipped.len());
        for skip in report.skipped.iter().take(10) {
            eprintln!("   linha {}: {}", skip.line(), skip.reason);
        }
    }

    if options.skip_payload_validation {
        eprintln!("\n✔️  Validation skipped");
    } else if report.invalid_count > 0 {
        eprintln!("\n✔️  Validation:");
        eprintln!("   ✅ Valid: {}", report.valid_count);
        eprintln!("   ❌ Invalid: {}", report.invalid_count);
        for (i, errors) in report.validation_errors.iter().take(5) {
            eprintln!("\n   Lesson {}:", i);
            for err in errors.iter().take(3) {
                eprintln!("     - {}", err);
            }
        }
    } else {
        eprintln!("\n✔️  All {} lessons valid!", report.valid_count);
    }

    let payload_json = serde_json::to_string_pretty(&report.payload)?;
    write_output(&payload_json, output)?;

    if let Some(grouped_path) = grouped_output {
        let grouped_json = serde_json::to_string_pretty(&report.modules)?;
        fs::write(grouped_path, &grouped_json)?;
        eprintln!("   💾 Grouped modules saved to: {}", grouped_path.display());
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_inspect(input: &Path, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🔍 Inspecting: {}", input.display());

    let bytes = fs::read(input)?;
    let inspection = inspect_bytes(&bytes, &input.to_string_lossy(), &config.aliases)?;

    println!("Format:   {:?}", inspection.table.format);
    if let Some(ref encoding) = inspection.table.encoding {
        println!("Encoding: {}", encoding);
    }
    println!("Rows:     {}", inspection.table.row_count);
    println!(
        "Template: {}",
        match inspection.template {
            TemplateKind::New => "new",
            TemplateKind::Legacy => "legacy",
        }
    );
    println!("Columns:  {}", inspection.table.headers.join(", "));
    if let Some(ref discipline) = inspection.discipline {
        println!("Disciplina: {}", discipline);
    }
    if let Some(ref front) = inspection.front {
        println!("Frente:     {}", front);
    }
    if !inspection.missing_new_template_columns.is_empty() {
        println!(
            "Missing for new template: {}",
            inspection.missing_new_template_columns.join(", ")
        );
    }
    for warning in &inspection.table.warnings {
        println!("⚠️  {}", warning);
    }

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
