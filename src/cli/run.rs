use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::ReportsmithError;
use crate::model::{Generator, OpenAiGenerator};
use crate::output::write_report;
use crate::planner::plan_report;
use crate::progress::ProgressSender;
use crate::runner::Orchestrator;
use crate::search::{SearchProvider, TavilyClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    info!("Loading config from {:?}", args.config);
    let mut config = Config::load_or_default(&args.config)?;

    // Apply CLI overrides
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(report_dir) = args.report_dir {
        config.report_dir = report_dir;
    }
    if let Some(rounds) = args.max_search_iterations {
        config.builder.max_search_iterations = rounds;
    }
    config.validate()?;

    let model: Arc<dyn Generator> = Arc::new(
        OpenAiGenerator::from_env(&config.providers.openai)?
            .with_timeout(Duration::from_secs(config.timeout_sec))
            .with_retry(config.retry.clone()),
    );
    let search: Arc<dyn SearchProvider> = Arc::new(
        TavilyClient::from_env(&config.providers.tavily)?
            .with_retry(config.retry.clone())
            .with_max_results(config.search.results_per_query),
    );

    if args.plan_only {
        let plan = plan_report(
            model.as_ref(),
            search.as_ref(),
            &config,
            &args.topic,
            args.feedback.as_deref(),
        )
        .await?;

        println!("Report plan for: {}", args.topic);
        for (idx, section) in plan.iter().enumerate() {
            let kind = if section.research { "research" } else { "synthesis" };
            println!("  {}. [{}] {} - {}", idx + 1, kind, section.name, section.description);
        }
        return Ok(());
    }

    // Stream progress events into the log as the waves advance.
    let (progress, mut events) = ProgressSender::channel();
    let reporter = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            info!(node = %event.node, "{}", event.diff);
        }
    });

    let orchestrator = Orchestrator::new(config.clone(), model, search);
    let result = orchestrator
        .run(&args.topic, args.feedback.as_deref(), &progress)
        .await;
    drop(progress);
    let _ = reporter.await;

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            if let ReportsmithError::Build(build) = &e {
                error!(section = build.section(), "Section task failed, run aborted");
            }
            return Err(e.into());
        }
    };

    info!(
        "Completed in {:.1}s: {} sections ({} researched), {} chars",
        report.total_duration.as_secs_f64(),
        report.sections.len(),
        report.research_count(),
        report.document.len()
    );

    if args.stdout {
        println!("{}", report.document);
    } else {
        let path = write_report(&config.report_dir, &report)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}
