use crate::cli::HashArgs;
use crate::error::Result;
use crate::util::{hash_file, to_hex};

pub fn run(args: HashArgs) -> Result<()> {
    for path in &args.files {
        let (size, hash) = hash_file(path, args.kind)?;
        tracing::debug!(path = %path.display(), size, kind = %args.kind, "hashed");
        println!("{}  {}", to_hex(&hash), path.display());
    }
    Ok(())
}
