use std::{fs, sync::Arc};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slug_tree::application::{
    commands::nodes::NodeCommandService,
    dto::NodeDto,
    ports::{
        configuration::SlugConfigurationSource, time::Clock, util::Transliterator,
    },
    services::SlugLifecycleService,
};
use slug_tree::config::AppConfig;
use slug_tree::domain::tree::{Changeset, TypeMetadata};
use slug_tree::infrastructure::{
    fixture::{FixtureOperation, TreeFixture},
    time::{FixedClock, SystemClock},
    unit_of_work::InMemoryUnitOfWork,
    util::DefaultTransliterator,
};

#[derive(Serialize)]
struct Report {
    operations: Vec<NodeDto>,
    slugs: Vec<NodeDto>,
}

fn main() {
    if let Err(err) = run() {
        tracing::error!(error = %err, "fatal error");
        eprintln!("fatal error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Loads `.env` as well, so it runs before the subscriber reads RUST_LOG.
    let mut config = AppConfig::from_env()?;
    init_tracing();
    if let Some(path) = std::env::args().nth(1) {
        config = config.with_fixture_path(path);
    }
    config.ensure_fixture()?;

    let raw = fs::read_to_string(config.fixture_path())
        .with_context(|| format!("reading {}", config.fixture_path().display()))?;
    let fixture = TreeFixture::from_json_str(&raw)?;

    let metadata: Arc<dyn TypeMetadata> = Arc::new(fixture.types);
    let configuration: Arc<dyn SlugConfigurationSource> = Arc::new(fixture.configuration);
    let transliterator: Arc<dyn Transliterator> = Arc::new(DefaultTransliterator);
    let clock: Arc<dyn Clock> = match config.fixed_time() {
        Some(value) => Arc::new(
            FixedClock::parse(value).with_context(|| format!("parsing instant `{value}`"))?,
        ),
        None => Arc::new(SystemClock),
    };

    let lifecycle = SlugLifecycleService::new(
        Arc::clone(&configuration),
        Arc::clone(&metadata),
        Arc::clone(&transliterator),
        Arc::clone(&clock),
    )?;
    let mut commands = NodeCommandService::new(lifecycle, Arc::clone(&metadata));
    let mut uow = InMemoryUnitOfWork::new(Arc::clone(&metadata));

    for node in fixture.nodes {
        commands.create_node(&mut uow, node)?;
    }
    log_changeset(&config, "initial tree", &uow.commit());

    let mut operations = Vec::with_capacity(fixture.operations.len());
    for operation in fixture.operations {
        let result = match operation {
            FixtureOperation::Create(command) => commands.create_node(&mut uow, command)?,
            FixtureOperation::Update(command) => commands.update_node(&mut uow, command)?,
        };
        log_changeset(&config, "operation", &uow.commit());
        operations.push(result);
    }

    let mut slugs = Vec::with_capacity(uow.len());
    let ids: Vec<_> = uow.nodes().map(|node| node.id).collect();
    for id in ids {
        slugs.push(commands.describe(&uow, id)?);
    }

    let report = Report { operations, slugs };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn log_changeset(config: &AppConfig, stage: &str, changeset: &Changeset) {
    tracing::info!(
        stage,
        changes = changeset.fields.len(),
        replacements = changeset.relative_replacements.len(),
        "committed unit of work"
    );
    if config.print_changeset() {
        for replacement in &changeset.relative_replacements {
            tracing::info!(
                stage,
                root_type = %replacement.root_type,
                field = %replacement.field,
                from = %replacement.from,
                to = %replacement.to,
                "stored prefix replaced"
            );
        }
        for change in &changeset.fields {
            tracing::info!(
                stage,
                node = %change.id,
                field = %change.field,
                before = ?change.before,
                after = ?change.after,
                "field written"
            );
        }
    }
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .ok()
        .unwrap_or_else(|| "info,slug_tree=info".to_string());

    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    if subscriber.try_init().is_err() {
        tracing::warn!("tracing subscriber already initialised");
    }
}
