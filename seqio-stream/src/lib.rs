//! Buffered sequential streams for archival tools.
//!
//! A [`Stream`] either reads one source through a fixed-size buffer, or writes
//! the same bytes to several destinations at once. Use [`Stream::open_read`] to
//! parse a stream and [`Stream::open_write`] / [`Stream::create`] to produce one.

mod error;
pub mod handle;
pub mod hashing;
mod hex;
pub mod mem;
pub mod path;
mod stream;

pub use error::{ParseError, StreamError};
pub use handle::Handle;
pub use hashing::{memhash, ContentHasher, HashKind};
pub use path::{StreamPath, PATH_MAX};
pub use stream::{Mode, Stream, STREAM_SIZE};
