//! CLI `doctor` command — run database diagnostics and print a health report.

use anyhow::{Context, Result};

use crate::config::FlashbackConfig;
use crate::db;

/// Run database diagnostics and print a health report.
pub fn doctor(config: &FlashbackConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `flashback serve` to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path)
        .context("failed to open database (may be corrupt)")?;

    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("Flashback Health Report");
    println!("=======================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    match report.schema_version {
        Some(v) if v == db::version::SCHEMA_VERSION => {
            println!("Schema version:    {v} (OK)");
        }
        Some(v) => {
            println!(
                "Schema version:    {v} (MISMATCH — binary expects {})",
                db::version::SCHEMA_VERSION
            );
        }
        None => println!("Schema version:    (not seeded)"),
    }
    println!();
    println!("Row counts:");
    println!("  Messages:        {}", report.message_count);
    println!("  Index entries:   {}", report.index_count);
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        if report.message_count != report.index_count {
            println!(
                "  Index drift: {} messages vs {} index entries",
                report.message_count, report.index_count
            );
        }
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
