pub mod dryrun;
pub mod lock;

pub use dryrun::handle_dryrun;
pub use lock::handle_lock;
