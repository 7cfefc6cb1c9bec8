use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;

use cadence_core::generator::TextGenerator;
use cadence_core::models::Calendar;
use cadence_core::{CalendarInput, export, generate_calendar};

/// Arguments of `cadence generate`.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub export: Option<PathBuf>,
    pub seed: Option<u64>,
}

/// Read an input file, run one calendar, and write the results.
///
/// The calendar JSON goes to `--output` or stdout; `--export` additionally
/// writes the spreadsheet.
pub async fn run_generate(opts: &GenerateOptions, generator: &dyn TextGenerator) -> Result<()> {
    let raw = std::fs::read_to_string(&opts.input)
        .with_context(|| format!("failed to read input file {}", opts.input.display()))?;
    let input: CalendarInput = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse input file {}", opts.input.display()))?;
    let request = input.validate().context("invalid calendar input")?;

    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    tracing::info!(
        week = request.week_number,
        posts = request.company.posts_per_week,
        generator = generator.name(),
        "generating calendar"
    );
    let calendar = generate_calendar(&request, generator, &mut rng).await?;

    let json = serde_json::to_string_pretty(&calendar).context("failed to serialize calendar")?;
    match &opts.output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            print_summary(&calendar);
            println!("Calendar written to {}", path.display());
        }
        None => println!("{json}"),
    }

    if let Some(path) = &opts.export {
        let file = std::fs::File::create(path)
            .with_context(|| format!("cannot create export file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        export::write_sheet(&calendar, &mut writer)
            .with_context(|| format!("failed to export sheet to {}", path.display()))?;
        writer.flush()?;
        if opts.output.is_some() {
            println!("Sheet exported to {}", path.display());
        }
    }

    Ok(())
}

fn print_summary(calendar: &Calendar) {
    println!(
        "Week {} for {}: {} posts, {} comments, average quality {:.1}",
        calendar.week_number,
        calendar.company,
        calendar.total_posts,
        calendar.total_comments,
        calendar.average_quality,
    );
    for post in &calendar.posts {
        let flag = if post.warning.is_some() { " (low quality)" } else { "" };
        println!(
            "  {:<4} {:<16} {:<20} {} {:>4.1}{flag}",
            post.post_id,
            post.instant.format("%a %d %b %H:%M"),
            post.channel,
            post.author,
            post.quality_score,
        );
    }
    if calendar.spam_report.has_issues {
        println!(
            "Audit: {} issue(s), {} severity",
            calendar.spam_report.issues.len(),
            calendar.spam_report.severity,
        );
    }
}
