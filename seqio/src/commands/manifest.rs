use std::path::PathBuf;

use seqio_stream::{HashKind, Stream};

use crate::cli::ManifestArgs;
use crate::error::{Error, Result};
use crate::manifest::{write_entry, Entry};
use crate::util::hash_file;

/// Hashes `files` and writes one manifest line per file to every output.
pub(crate) fn write_manifest(
    outputs: &[PathBuf],
    files: &[PathBuf],
    kind: HashKind,
) -> Result<u64> {
    let mut stream = Stream::open_write(outputs.len());
    for (index, path) in outputs.iter().enumerate() {
        if let Err(source) = stream.attach(index, path) {
            let _ = stream.close();
            return Err(Error::CreateFile {
                path: path.clone(),
                source,
            });
        }
    }

    let mut total = 0;
    for path in files {
        let (size, hash) = match hash_file(path, kind) {
            Ok(v) => v,
            Err(e) => {
                let _ = stream.close();
                return Err(e);
            }
        };
        total += size;

        let entry = Entry {
            size,
            hash,
            path: path.clone(),
        };
        if let Err(source) = write_entry(&mut stream, &entry) {
            let _ = stream.close();
            return Err(Error::WriteOutput { source });
        }
    }

    stream
        .close()
        .map_err(|source| Error::WriteOutput { source })?;
    Ok(total)
}

pub fn run(args: ManifestArgs) -> Result<()> {
    let total = write_manifest(&args.outputs, &args.files, args.kind)?;

    tracing::info!(
        files = args.files.len(),
        outputs = args.outputs.len(),
        bytes = total,
        "wrote manifest"
    );
    for output in &args.outputs {
        println!("{}", output.display());
    }
    Ok(())
}
