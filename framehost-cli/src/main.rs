//! framehost CLI
//!
//! `framehost classify <bundle>` prints the framework a bundle targets.
//! `framehost run <bundle>` drives the bundle through a full instance
//! lifecycle on a framework that only logs what it is asked to do.

mod trace_framework;

use anyhow::Context;
use clap::{Parser, Subcommand};
use framehost::{
    classify, init, FrameworkRegistry, HostInit, RuntimeConfig, ServiceCatalog,
    ServiceDescriptor, DEFAULT_FRAMEWORK,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::trace_framework::TraceFramework;

#[derive(Parser, Debug)]
#[command(name = "framehost", about = "Multi-framework bundle host")]
struct Args {
    /// Runtime configuration (TOML)
    #[arg(long, global = true, env = "FRAMEHOST_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the framework tag of a bundle
    Classify { bundle: PathBuf },
    /// Create, feed, refresh and destroy an instance of a bundle
    Run {
        bundle: PathBuf,
        #[arg(long, default_value = "1")]
        id: String,
        /// Initial data as JSON
        #[arg(long)]
        data: Option<String>,
        /// Task list as JSON, delivered through receiveTasks
        #[arg(long)]
        tasks: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("framehost=info".parse()?),
        )
        .with_ansi(false)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };

    match args.command {
        Command::Classify { bundle } => {
            let code = read_bundle(&bundle)?;
            println!("{}", classify(&code).framework());
            Ok(())
        }
        Command::Run {
            bundle,
            id,
            data,
            tasks,
        } => run(config, &bundle, &id, data.as_deref(), tasks.as_deref()),
    }
}

fn run(
    config: RuntimeConfig,
    bundle: &Path,
    id: &str,
    data: Option<&str>,
    tasks: Option<&str>,
) -> anyhow::Result<()> {
    let code = read_bundle(bundle)?;
    let data = parse_json("--data", data)?;
    let tasks = parse_json("--tasks", tasks)?;

    let tag = classify(&code).framework().to_string();
    let mut frameworks =
        FrameworkRegistry::builder().register(tag.clone(), Arc::new(TraceFramework::new(&tag)));
    if tag != DEFAULT_FRAMEWORK {
        frameworks = frameworks.register(
            DEFAULT_FRAMEWORK,
            Arc::new(TraceFramework::new(DEFAULT_FRAMEWORK)),
        );
    }
    let frameworks = frameworks.build();

    let mut host = init(
        HostInit::new(frameworks)
            .with_config(config)
            .with_services(default_services()),
    )?;

    let created = host.invoke(
        "createInstance",
        &[json!(id), json!(code), json!({}), data],
    )?;
    info!(result = %created, "createInstance");

    if !tasks.is_null() {
        let received = host.invoke("receiveTasks", &[json!(id), tasks])?;
        info!(result = %received, "receiveTasks");
    }

    let root = host.invoke("getRoot", &[json!(id)])?;
    info!(result = %root, "getRoot");
    host.invoke("refreshInstance", &[json!(id), json!({})])?;
    host.invoke("destroyInstance", &[json!(id)])?;

    println!("{}", serde_json::to_string_pretty(&created)?);
    Ok(())
}

fn default_services() -> ServiceCatalog {
    let mut services = ServiceCatalog::new();
    services.register(
        ServiceDescriptor::new("console")
            .on_create(|id, env, _config| {
                info!(instance = %id, framework = %env.framework, "console service attached");
                let mut exports = serde_json::Map::new();
                exports.insert("instance".to_string(), json!({ "createdAt": env.created.to_rfc3339() }));
                exports.insert("console".to_string(), json!(["log", "info", "warn", "error"]));
                Ok(exports)
            })
            .on_refresh(|id, ctx| {
                info!(instance = %id, framework = %ctx.info.framework, "console service refreshed");
                Ok(())
            })
            .on_destroy(|id, ctx| {
                info!(instance = %id, framework = %ctx.info.framework, "console service detached");
                Ok(())
            }),
    );
    services
}

fn read_bundle(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read bundle {}", path.display()))
}

fn parse_json(flag: &str, raw: Option<&str>) -> anyhow::Result<Value> {
    match raw {
        Some(raw) => serde_json::from_str(raw).with_context(|| format!("{flag} is not valid JSON")),
        None => Ok(Value::Null),
    }
}
