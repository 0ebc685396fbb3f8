//! Strongly typed, zero-cost identifier wrappers.
//!
//! Every agent kind has its own id type so a vehicle index can never be used
//! to look up a signal.  The inner integer is the agent's position in its
//! roster `Vec`; `Display` renders the one-based label used in logs and
//! output files (`TL-1`, `V-3`, `D-2`).

use std::fmt;

/// Generate a typed ID wrapper around a `u32` roster index.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident => $prefix:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub u32);

        impl $name {
            /// Label prefix used by `Display`.
            pub const PREFIX: &'static str = $prefix;

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0 as u64 + 1)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                u32::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a traffic signal in the signal roster.
    pub struct SignalId => "TL";
}

typed_id! {
    /// Index of a vehicle in the vehicle roster.
    pub struct VehicleId => "V";
}

typed_id! {
    /// Index of an aerial sentinel (drone) in the sentinel roster.
    pub struct SentinelId => "D";
}

// ── AgentKind / AgentRef ──────────────────────────────────────────────────────

/// The three agent families.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentKind {
    Signal,
    Vehicle,
    Sentinel,
}

impl AgentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentKind::Signal => "traffic_light",
            AgentKind::Vehicle => "vehicle",
            AgentKind::Sentinel => "drone",
        }
    }

    /// Stream discriminator mixed into per-agent RNG seeds so that
    /// `SignalId(0)` and `VehicleId(0)` draw from different streams.
    #[inline]
    pub(crate) fn stream(self) -> u64 {
        match self {
            AgentKind::Signal => 1,
            AgentKind::Vehicle => 2,
            AgentKind::Sentinel => 3,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to any agent, regardless of kind.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentRef {
    Signal(SignalId),
    Vehicle(VehicleId),
    Sentinel(SentinelId),
}

impl AgentRef {
    #[inline]
    pub fn kind(self) -> AgentKind {
        match self {
            AgentRef::Signal(_) => AgentKind::Signal,
            AgentRef::Vehicle(_) => AgentKind::Vehicle,
            AgentRef::Sentinel(_) => AgentKind::Sentinel,
        }
    }

    /// Roster index within the agent's own kind.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            AgentRef::Signal(id) => id.index(),
            AgentRef::Vehicle(id) => id.index(),
            AgentRef::Sentinel(id) => id.index(),
        }
    }
}

impl From<SignalId> for AgentRef {
    fn from(id: SignalId) -> Self {
        AgentRef::Signal(id)
    }
}

impl From<VehicleId> for AgentRef {
    fn from(id: VehicleId) -> Self {
        AgentRef::Vehicle(id)
    }
}

impl From<SentinelId> for AgentRef {
    fn from(id: SentinelId) -> Self {
        AgentRef::Sentinel(id)
    }
}

impl fmt::Display for AgentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentRef::Signal(id) => id.fmt(f),
            AgentRef::Vehicle(id) => id.fmt(f),
            AgentRef::Sentinel(id) => id.fmt(f),
        }
    }
}
