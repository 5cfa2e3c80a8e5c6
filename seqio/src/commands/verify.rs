use std::path::Path;

use seqio_stream::{HashKind, Stream};

use crate::cli::VerifyArgs;
use crate::error::{Error, Result};
use crate::manifest::EntryReader;
use crate::util::hash_file;

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Report {
    pub total: usize,
    pub failed: usize,
}

/// Rehashes every file listed in `manifest`, printing one status line each.
pub(crate) fn check_manifest(manifest: &Path, kind: HashKind) -> Result<Report> {
    let mut stream = Stream::open_read(manifest).map_err(|source| Error::OpenFile {
        path: manifest.to_path_buf(),
        source,
    })?;
    let mut entries = EntryReader::new(&mut stream, manifest);
    let mut report = Report::default();

    while let Some(entry) = entries.next_entry()? {
        report.total += 1;

        let status = match hash_file(&entry.path, kind) {
            Ok((size, hash)) if size == entry.size && hash == entry.hash => "OK",
            Ok((size, _)) => {
                tracing::warn!(
                    path = %entry.path.display(),
                    expected = entry.size,
                    actual = size,
                    "content mismatch"
                );
                "FAILED"
            }
            Err(e) => {
                tracing::warn!(path = %entry.path.display(), error = %e, "cannot check file");
                "FAILED (unreadable)"
            }
        };

        if status != "OK" {
            report.failed += 1;
        }
        println!("{}: {}", entry.path.display(), status);
    }

    Ok(report)
}

pub fn run(args: VerifyArgs) -> Result<()> {
    let report = check_manifest(&args.manifest, args.kind)?;

    if report.failed > 0 {
        return Err(Error::VerifyFailed {
            failed: report.failed,
            total: report.total,
        });
    }

    tracing::info!(files = report.total, "all files verified");
    Ok(())
}
