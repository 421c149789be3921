// Session module - the two session loops and their shutdown handshake
pub mod receive;
pub mod relay;
pub mod session;
pub mod shutdown;
pub mod state;

pub use receive::{ReceiveExit, ReceiveLoop, ReceiveState};
pub use relay::{classify, InputRelay, Key, KeyAction, KeyDecision, KeySource, KeyStroke, RelayExit};
pub use session::run_session;
pub use shutdown::{ShutdownFlag, ShutdownState};
pub use state::{SessionOutcome, SessionReport, SessionStatistics, StatisticsSnapshot};
