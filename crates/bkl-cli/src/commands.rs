use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use tokio::io::AsyncReadExt;

use bkl_append::{gunzip, AppendConfig, AppendContext, AppendError, Appender};
use bkl_query::{objects_before, objects_since, parse_date};
use bkl_store::{delete_object, has_object, read_object, FsObjectStore, ObjectStore};

use crate::cli::*;
use crate::config::BklConfig;

pub async fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = BklConfig::load(cli.config.as_deref())?;
    let root = config.resolve_root(cli.root);
    let store = Arc::new(
        FsObjectStore::open(&root).with_context(|| format!("opening store at {}", root.display()))?,
    );
    let mut out = std::io::stdout();

    match cli.command {
        Command::Append(args) => {
            let payload = read_payload(&args).await?;
            let append = config.append_config(args.gzip, args.max_backoff_secs);
            cmd_append(store, append, &args, &payload, &mut out).await?
        }
        Command::Cat(args) => cmd_cat(store.as_ref(), &args, &mut out).await?,
        Command::Exists(args) => {
            if !cmd_exists(store.as_ref(), &args, &mut out).await? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Ls(args) => cmd_ls(store.as_ref(), &args, &mut out).await?,
        Command::Rm(args) => cmd_rm(store.as_ref(), &args, &mut out).await?,
    }
    Ok(ExitCode::SUCCESS)
}

async fn read_payload(args: &AppendArgs) -> anyhow::Result<Vec<u8>> {
    match &args.file {
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut payload = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut payload)
                .await
                .context("reading stdin")?;
            Ok(payload)
        }
    }
}

async fn cmd_append<S: ObjectStore + ?Sized>(
    store: Arc<S>,
    config: AppendConfig,
    args: &AppendArgs,
    payload: &[u8],
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let ctx = match args.timeout_secs {
        Some(secs) => AppendContext::with_timeout(Duration::from_secs(secs)),
        None => AppendContext::background(),
    };
    let appender = Appender::new(store, config);

    match appender.append(&ctx, payload, &args.url).await {
        Ok(receipt) => {
            writeln!(
                out,
                "{} Appended {} bytes to {}",
                "✓".green().bold(),
                payload.len(),
                receipt.destination.to_string().bold()
            )?;
            writeln!(
                out,
                "  Generation: {}  Size: {}  Attempts: {}",
                receipt.generation.to_string().yellow(),
                receipt.size,
                receipt.attempts
            )?;
            Ok(())
        }
        // The data is durable; only the temporary object leaked.
        Err(e @ AppendError::CleanupFailed { .. }) => {
            eprintln!("{} {}", "warning:".yellow().bold(), e);
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("appending to {}", args.url)),
    }
}

async fn cmd_cat<S: ObjectStore + ?Sized>(
    store: &S,
    args: &CatArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let content = read_object(store, &args.url)
        .await
        .with_context(|| format!("reading {}", args.url))?;
    if args.decompress {
        let plain = gunzip(&content).with_context(|| format!("decompressing {}", args.url))?;
        out.write_all(&plain)?;
    } else {
        out.write_all(&content)?;
    }
    out.flush()?;
    Ok(())
}

async fn cmd_exists<S: ObjectStore + ?Sized>(
    store: &S,
    args: &ExistsArgs,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    let found = has_object(store, &args.url).await?;
    if found {
        writeln!(out, "{} {}", "exists".green(), args.url)?;
    } else {
        writeln!(out, "{} {}", "missing".red(), args.url)?;
    }
    Ok(found)
}

async fn cmd_ls<S: ObjectStore + ?Sized>(
    store: &S,
    args: &LsArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let names = match (&args.since, &args.before) {
        (Some(since), None) => {
            objects_since(store, &args.bucket, &args.prefix, &args.pattern, parse_date(since)?)
                .await?
        }
        (None, Some(before)) => {
            objects_before(store, &args.bucket, &args.prefix, &args.pattern, parse_date(before)?)
                .await?
        }
        _ => anyhow::bail!("exactly one of --since or --before is required"),
    };
    for name in names {
        writeln!(out, "{name}")?;
    }
    Ok(())
}

async fn cmd_rm<S: ObjectStore + ?Sized>(
    store: &S,
    args: &RmArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    delete_object(store, &args.url)
        .await
        .with_context(|| format!("removing {}", args.url))?;
    writeln!(out, "Removed {}", args.url.bold())?;
    Ok(())
}
