//! Plain-text reports printed around the interactive session.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use crate::duplicates::RankedGroups;
use crate::resolver::{ResolveOutcome, ResolveSummary};
use crate::scanner::ErrorRecord;

fn size_label(size: Option<u64>) -> String {
    match size {
        Some(bytes) => format!("{} bytes ({})", bytes, ByteSize::b(bytes)),
        None => "unknown size (no copy left on disk)".to_string(),
    }
}

/// Print the duplicate count and the reclaimable total.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn write_summary<W: Write>(out: &mut W, ranked: &RankedGroups) -> io::Result<()> {
    if ranked.is_empty() {
        return writeln!(out, "{}", "No duplicates found.".green());
    }
    writeln!(
        out,
        "Found {} duplicate group(s) holding {} files.",
        ranked.len(),
        ranked.file_count()
    )?;
    writeln!(
        out,
        "The duplicates consume a total of {} bytes ({}).",
        ranked.total_reclaimable,
        ByteSize::b(ranked.total_reclaimable).bold()
    )
}

/// Print the files that were never considered because hashing failed.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn write_errors<W: Write>(out: &mut W, errors: &[ErrorRecord]) -> io::Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    writeln!(
        out,
        "{}",
        format!("{} file(s) could not be analysed:", errors.len()).yellow()
    )?;
    for record in errors {
        writeln!(
            out,
            "  {} ({}: {})",
            record.path.display(),
            record.kind,
            record.message
        )?;
    }
    Ok(())
}

/// Print every group with its files, largest first.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn write_groups<W: Write>(out: &mut W, ranked: &RankedGroups) -> io::Result<()> {
    for (i, group) in ranked.groups.iter().enumerate() {
        writeln!(
            out,
            "{}/{} {} files, {}",
            i + 1,
            ranked.len(),
            group.len(),
            size_label(group.size)
        )?;
        for file in &group.files {
            writeln!(out, "    {}", file.display())?;
        }
    }
    Ok(())
}

/// Print what the resolver did.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn write_resolution<W: Write>(out: &mut W, summary: &ResolveSummary) -> io::Result<()> {
    let ending = match summary.outcome {
        ResolveOutcome::Completed => "All groups visited",
        ResolveOutcome::Quit => "Stopped",
    };
    writeln!(
        out,
        "{}: {} resolved, {} skipped, {} file(s) trashed, {} freed.",
        ending,
        summary.groups_resolved,
        summary.groups_skipped,
        summary.files_trashed,
        ByteSize::b(summary.bytes_freed)
    )
}
