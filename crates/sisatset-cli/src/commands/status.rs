//! Status command for showing the database and its record counts.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use sisatset_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database, database_path: &Path) -> Result<()> {
    let counts = db.table_counts()?;

    writeln!(writer, "SiSatSet status")?;
    writeln!(writer, "Database: {}", database_path.display())?;

    if counts.is_empty() {
        writeln!(writer, "No records stored.")?;
        return Ok(());
    }

    writeln!(writer, "Records:")?;
    for count in counts {
        writeln!(writer, "- {}: {}", count.table, count.records)?;
    }

    Ok(())
}
