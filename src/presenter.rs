pub mod terminal;

use crate::brief::Brief;
use crate::forecast::ChainReport;
use crate::session::SessionStatus;

/// Sink for everything the user sees.
pub trait Presenter: Send + Sync {
    fn session(&self, status: &SessionStatus);

    /// Used when the brief itself is the requested output.
    fn brief(&self, brief: &Brief);

    fn forecast(&self, symbol: &str, report: &ChainReport);
}
