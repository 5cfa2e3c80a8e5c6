use std::path::Path;

use seqio_stream::hashing::HASH_SIZE;
use seqio_stream::{ContentHasher, HashKind, Stream, StreamError};

use crate::cli::ReplicateArgs;
use crate::error::{Error, Result};
use crate::util::{drain, human_size, to_hex};

/// Copies `source` to every path in `destinations` through one fan-out stream.
pub(crate) fn replicate(
    source: &Path,
    destinations: &[impl AsRef<Path>],
    kind: HashKind,
    sync: bool,
) -> Result<(u64, [u8; HASH_SIZE])> {
    let mut input = Stream::open_read(source).map_err(|e| Error::OpenFile {
        path: source.to_path_buf(),
        source: e,
    })?;

    let mut output = Stream::open_write(destinations.len());
    for (index, dest) in destinations.iter().enumerate() {
        if let Err(e) = output.attach(index, dest) {
            let _ = output.close();
            return Err(Error::CreateFile {
                path: dest.as_ref().to_path_buf(),
                source: e,
            });
        }
    }

    let mut hasher = ContentHasher::new(kind);
    let copied = drain(&mut input, |chunk| {
        hasher.update(chunk);
        output.write_bytes(chunk)
    });

    if let Err(e) = copied {
        let _ = output.close();
        return Err(match e {
            StreamError::Read { .. } => Error::ReadFile {
                path: source.to_path_buf(),
                source: e,
            },
            _ => Error::WriteOutput { source: e },
        });
    }

    let _ = input.close();

    if sync {
        output
            .flush()
            .and_then(|_| output.sync())
            .map_err(|source| Error::WriteOutput { source })?;
    }
    output
        .close()
        .map_err(|source| Error::WriteOutput { source })?;

    Ok((hasher.bytes_hashed(), hasher.finalize()))
}

pub fn run(args: ReplicateArgs) -> Result<()> {
    let (size, hash) = replicate(&args.source, &args.destinations[..], args.kind, args.sync)?;

    tracing::info!(
        source = %args.source.display(),
        destinations = args.destinations.len(),
        "replicated"
    );
    println!("{} ({})  {}", size, human_size(size), to_hex(&hash));
    Ok(())
}
