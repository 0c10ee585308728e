//! Server log grammar: raw lines in, typed events out.

pub mod event;
pub mod parser;
pub mod triggers;
pub mod vocab;


pub use event::{Event, EventData, EventKind, PlayerRef};
pub use parser::{LineParser, decode_log};
pub use triggers::{TriggerRule, TriggerTable};
