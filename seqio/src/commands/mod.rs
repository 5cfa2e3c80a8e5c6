pub mod hash;
pub mod manifest;
pub mod replicate;
pub mod verify;

pub use hash::run as hash;
pub use manifest::run as manifest;
pub use replicate::run as replicate;
pub use verify::run as verify;
