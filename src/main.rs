use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use regex::Regex;

use mailsort::config::MailboxConfig;
use mailsort::mailbox::{GmailMailbox, MailboxService};
use mailsort::model::{ModelTrainer, TrainedModel};
use mailsort::pipeline::corpus::{CorpusBuilder, DEFAULT_LABEL_PATTERN, DEFAULT_PER_LABEL_CAP};
use mailsort::pipeline::Categorizer;

#[derive(Parser)]
#[command(name = "mailsort")]
#[command(about = "Rule-and-model email categorization")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the classifier from labeled mail and write the model artifact
    Train {
        /// Where to write the model artifact
        #[arg(long, default_value = "models/model.dat")]
        artifact: PathBuf,
        /// Label names to exclude from the corpus (repeatable)
        #[arg(long = "exclude")]
        exclude: Vec<String>,
        /// Messages fetched per label
        #[arg(long, default_value_t = DEFAULT_PER_LABEL_CAP)]
        per_label_cap: u32,
        /// Fraction of the corpus held out for accuracy diagnostics
        #[arg(long, default_value_t = 0.1)]
        holdout: f64,
        /// Regex selecting trainable label names
        #[arg(long, default_value = DEFAULT_LABEL_PATTERN)]
        label_pattern: String,
    },
    /// Classify unread mail and move it out of the inbox
    Categorize {
        /// Path to a previously trained model artifact
        #[arg(long, default_value = "models/model.dat")]
        artifact: PathBuf,
        /// Maximum unread messages to process
        #[arg(long, default_value_t = 1000)]
        max_messages: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = MailboxConfig::from_env().context("mailbox credentials")?;
    let mailbox: Arc<dyn MailboxService> =
        Arc::new(GmailMailbox::new(config).context("mailbox client")?);

    match cli.command {
        Commands::Train {
            artifact,
            exclude,
            per_label_cap,
            holdout,
            label_pattern,
        } => {
            anyhow::ensure!(
                (0.0..1.0).contains(&holdout),
                "--holdout must be in [0.0, 1.0)"
            );
            let pattern = Regex::new(&label_pattern).context("--label-pattern")?;

            let (corpus, corpus_report) = CorpusBuilder::new(mailbox, pattern)
                .exclude(exclude)
                .per_label_cap(per_label_cap)
                .build()
                .await?;

            let (model, report) = ModelTrainer::new(holdout).train(&corpus)?;
            model.save(&artifact)?;

            eprintln!("Trained on {} samples ({} skipped)", report.samples, corpus_report.skipped);
            for (label, count) in &report.class_counts {
                eprintln!("  {label}: {count}");
            }
            if let Some(accuracy) = report.holdout_accuracy {
                eprintln!("Holdout accuracy: {:.1}%", accuracy * 100.0);
            }
            eprintln!("Model saved to {}", artifact.display());
        }
        Commands::Categorize {
            artifact,
            max_messages,
        } => {
            let model = TrainedModel::load(&artifact)
                .with_context(|| format!("loading model artifact {}", artifact.display()))?;

            let categorizer = Categorizer::new(mailbox, Some(model)).await?;
            let report = categorizer.run(max_messages).await?;

            eprintln!(
                "Categorized {} messages ({} skipped)",
                report.processed, report.skipped
            );
            for (label, count) in &report.counts {
                eprintln!("  {label}: {count}");
            }
        }
    }

    Ok(())
}
