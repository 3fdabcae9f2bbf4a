//! Event sink boundary
//!
//! The core reports notable moments to an observer. The observer is
//! never consulted for decisions, so the simulation behaves
//! identically whether the sink records or drops everything.

use serde::{Deserialize, Serialize};

use crate::clan::ClanRule;
use crate::core::types::{ClanId, Cycle};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Notable moments the core reports
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    ClanFormed {
        clan: ClanId,
        members: usize,
        density: f64,
    },
    ClanDecision {
        clan: ClanId,
        rule: ClanRule,
    },
    ConflictInitiated {
        attacker: ClanId,
        victim: ClanId,
    },
    ResourceTheft {
        attacker: ClanId,
        victim: ClanId,
        amount: f64,
    },
    InterClanDistribution {
        pool: f64,
        clans: usize,
    },
}

/// Observer the core reports events to
pub trait EventSink {
    fn record(&mut self, cycle: Cycle, event: SimEvent, severity: Severity);
}

/// Sink that drops everything (the default collaborator)
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _cycle: Cycle, _event: SimEvent, _severity: Severity) {}
}

/// One recorded event with its cycle and severity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub cycle: Cycle,
    pub event: SimEvent,
    pub severity: Severity,
}

/// Recording sink that keeps every event in order
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    pub events: Vec<RecordedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events_for_cycle(&self, cycle: Cycle) -> impl Iterator<Item = &RecordedEvent> {
        self.events.iter().filter(move |e| e.cycle == cycle)
    }

    pub fn count_severity(&self, severity: Severity) -> usize {
        self.events.iter().filter(|e| e.severity == severity).count()
    }
}

impl EventSink for EventLog {
    fn record(&mut self, cycle: Cycle, event: SimEvent, severity: Severity) {
        self.events.push(RecordedEvent {
            cycle,
            event,
            severity,
        });
    }
}
