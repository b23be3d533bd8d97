//! Outcomes of client intents.
//!
//! A rejected intent leaves the match untouched and is only logged; it is not
//! an [`EngineError`](crate::executor::EngineError).

/// Why an intent was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    GameNotRunning,
    /// Registration refused: match full, already started, or unknown cards.
    RegistrationRefused,
    AlreadyRegistered,
    UnknownConnection,
    NotActivePlayer,
    CardNotInHand,
    CannotPay,
    UnknownZone,
    NoPendingSelection,
    NotChooser,
    NoPendingDiscard,
    /// A discard is outstanding; the turn cannot be stopped again.
    DiscardPending,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            RejectReason::GameNotRunning => "match is not running",
            RejectReason::RegistrationRefused => "registration refused",
            RejectReason::AlreadyRegistered => "connection already registered",
            RejectReason::UnknownConnection => "connection has no player",
            RejectReason::NotActivePlayer => "not the active player",
            RejectReason::CardNotInHand => "card is not in hand",
            RejectReason::CannotPay => "cannot pay the card's costs",
            RejectReason::UnknownZone => "no such zone",
            RejectReason::NoPendingSelection => "no target selection is pending",
            RejectReason::NotChooser => "selection belongs to another player",
            RejectReason::NoPendingDiscard => "no discard is pending",
            RejectReason::DiscardPending => "waiting for a discard",
        };
        f.write_str(text)
    }
}

/// Result of handling one client intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentOutcome {
    /// The intent took effect.
    Applied,
    /// The intent was accepted but waits on a follow-up reply (discard choice).
    Deferred,
    /// The reply was invalid; the same request was sent again.
    Reprompted,
    Rejected(RejectReason),
}

impl IntentOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, IntentOutcome::Applied)
    }
}
