//! Visual state of a station marker.
//!
//! The host still speaks in the legacy integer codes (0 default, 1 hovered,
//! 2 selected, 3 both), so every state keeps its code, but transitions go
//! through [`MarkerState::apply`] which refuses to set a flag twice or clear a
//! flag that is not set.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MapError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarkerState {
    #[default]
    Default,
    Hovered,
    Selected,
    HoveredSelected,
}

/// A single state bit the host can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateFlag {
    Hovered,
    Selected,
}

/// What a `setStationsState` call asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateAction {
    Add(StateFlag),
    Remove(StateFlag),
}

impl StateFlag {
    pub const ALL: [StateFlag; 2] = [StateFlag::Hovered, StateFlag::Selected];

    pub fn code(self) -> i64 {
        match self {
            StateFlag::Hovered => 1,
            StateFlag::Selected => 2,
        }
    }

    /// Suffix used in the marker CSS classes (`svg-icon-hovered`, ...).
    pub fn class_suffix(self) -> &'static str {
        match self {
            StateFlag::Hovered => "hovered",
            StateFlag::Selected => "selected",
        }
    }
}

impl fmt::Display for StateFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_suffix())
    }
}

impl MarkerState {
    pub fn code(self) -> i64 {
        match self {
            MarkerState::Default => 0,
            MarkerState::Hovered => 1,
            MarkerState::Selected => 2,
            MarkerState::HoveredSelected => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(MarkerState::Default),
            1 => Some(MarkerState::Hovered),
            2 => Some(MarkerState::Selected),
            3 => Some(MarkerState::HoveredSelected),
            _ => None,
        }
    }

    pub fn contains(self, flag: StateFlag) -> bool {
        self.code() & flag.code() != 0
    }

    pub fn is_selected(self) -> bool {
        self.contains(StateFlag::Selected)
    }

    pub fn is_hovered(self) -> bool {
        self.contains(StateFlag::Hovered)
    }

    /// Apply an action, returning the new state or the reason it was refused.
    pub fn apply(self, action: StateAction) -> Result<MarkerState, MapError> {
        let refused = MapError::Transition { from: self, action };
        let code = match action {
            StateAction::Add(flag) if !self.contains(flag) => self.code() | flag.code(),
            StateAction::Remove(flag) if self.contains(flag) => self.code() & !flag.code(),
            _ => return Err(refused),
        };
        MarkerState::from_code(code).ok_or(refused)
    }
}

impl fmt::Display for MarkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerState::Default => f.write_str("default"),
            MarkerState::Hovered => f.write_str("hovered"),
            MarkerState::Selected => f.write_str("selected"),
            MarkerState::HoveredSelected => f.write_str("hovered+selected"),
        }
    }
}

impl StateAction {
    /// Decode the wire integer: a positive flag code adds it, its bitwise
    /// complement removes it.
    pub fn from_code(code: i64) -> Result<Self, MapError> {
        for flag in StateFlag::ALL {
            if code == flag.code() {
                return Ok(StateAction::Add(flag));
            }
            if code == !flag.code() {
                return Ok(StateAction::Remove(flag));
            }
        }
        Err(MapError::InvalidStateCode(code))
    }

    pub fn code(self) -> i64 {
        match self {
            StateAction::Add(flag) => flag.code(),
            StateAction::Remove(flag) => !flag.code(),
        }
    }

    pub fn flag(self) -> StateFlag {
        match self {
            StateAction::Add(flag) | StateAction::Remove(flag) => flag,
        }
    }

    pub fn is_add(self) -> bool {
        matches!(self, StateAction::Add(_))
    }
}

impl fmt::Display for StateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateAction::Add(flag) => write!(f, "add {flag}"),
            StateAction::Remove(flag) => write!(f, "remove {flag}"),
        }
    }
}
