use thiserror::Error;

use crate::state::{MarkerState, StateAction};

/// Everything that can go wrong while applying a host command or wiring the page.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("{command}: missing argument #{index}")]
    MissingArgument { command: &'static str, index: usize },

    #[error("{command}: argument #{index} should be {expected}")]
    InvalidArgument {
        command: &'static str,
        index: usize,
        expected: &'static str,
    },

    #[error("{command}: malformed payload: {message}")]
    Payload {
        command: &'static str,
        message: String,
    },

    #[error("field '{field}' has {found} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid marker state code {0}")]
    InvalidStateCode(i64),

    #[error("cannot {action} from state {from}")]
    Transition {
        from: MarkerState,
        action: StateAction,
    },

    #[error("no marker for station '{0}'")]
    UnknownStation(String),

    #[error("no markers on the map")]
    EmptyGroup,

    #[error("map surface: {0}")]
    Surface(String),

    #[error("configuration: {0}")]
    Config(String),
}
