use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use phrasebook_catalog::MessageCatalog;
use serde::Deserialize;

#[derive(Debug, Parser)]
#[command(
    name = "msgfmt-lint",
    about = "Validates Phrasebook locale packs and their message patterns",
    version
)]
struct Args {
    /// 語言包資料夾路徑；預設為 assets/langs。 / Directory that contains locale JSON files (defaults to assets/langs).
    #[arg(value_name = "DIR", default_value = "assets/langs")]
    directory: PathBuf,
    /// 預設回退語系代碼。 / Default fallback locale code.
    #[arg(long, default_value = "en-US")]
    default_locale: String,
    /// 遇到缺少鍵時使程序失敗。 / Fail when locales are missing keys relative to fallback.
    #[arg(long)]
    fail_on_missing: bool,
    /// 比對參考鍵清單確保覆蓋率。 / Optional reference key list to compare against.
    #[arg(long, value_name = "FILE")]
    reference: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("msgfmt-lint error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    // Loading compiles every pattern, so this is also the syntax check:
    // unbalanced braces or a missing 'other' case abort the load with the
    // offending locale and key in the error chain.
    let catalog = MessageCatalog::load_from_dir(&args.directory, &args.default_locale)
        .with_context(|| format!("load locale packs from {}", args.directory.display()))?;

    let fallback = catalog.fallback_code().to_string();
    println!(
        "Validated {} locale(s); fallback locale: {}",
        catalog.locale_summaries().len(),
        fallback
    );

    let mut total_missing = 0usize;
    for stats in catalog.catalog_stats() {
        let mut line = format!(
            " - {} [{}]: {} message(s) ({} plural)",
            stats.display_name, stats.code, stats.total_entries, stats.plural_entries
        );
        if stats.code == fallback {
            line.push_str(" [fallback]");
            println!("{line}");
            continue;
        }

        let missing = catalog.missing_keys(&stats.code).unwrap_or_default();
        if missing.is_empty() {
            println!("{line}");
        } else {
            line.push_str(&format!(" — missing {} key(s)", missing.len()));
            println!("{line}");
            for key in missing.iter().take(5) {
                println!("     · {key}");
            }
            if missing.len() > 5 {
                println!("     · ... {} more", missing.len() - 5);
            }
        }
        total_missing += missing.len();
    }

    if total_missing > 0 {
        eprintln!(
            "Found {total_missing} missing message key(s) relative to fallback '{fallback}'"
        );
        if args.fail_on_missing {
            bail!("missing message keys detected");
        }
    }

    if let Some(reference) = args.reference.as_ref() {
        verify_reference_keys(&catalog, reference)?;
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct ReferenceSpec {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    locale: Option<String>,
    keys: Vec<String>,
}

fn verify_reference_keys(catalog: &MessageCatalog, path: &Path) -> Result<()> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read message reference {}", path.display()))?;
    let spec: ReferenceSpec = serde_json::from_str(&contents)
        .with_context(|| format!("parse reference {}", path.display()))?;
    let locale = spec
        .locale
        .unwrap_or_else(|| catalog.fallback_code().to_string());
    let missing: Vec<&String> = spec
        .keys
        .iter()
        .filter(|key| !catalog.locale_has_key(&locale, key))
        .collect();
    if missing.is_empty() {
        match spec.source {
            Some(source) => println!(
                "Reference coverage OK for locale '{}' against {} ({} keys)",
                locale,
                source,
                spec.keys.len()
            ),
            None => println!(
                "Reference coverage OK for locale '{}' ({} keys)",
                locale,
                spec.keys.len()
            ),
        }
        return Ok(());
    }
    eprintln!(
        "Message reference check failed for locale '{}'; missing {} key(s)",
        locale,
        missing.len()
    );
    for key in missing {
        eprintln!("  · {key}");
    }
    bail!("reference coverage mismatch detected");
}
