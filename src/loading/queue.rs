//! Sequential part load queue.
//!
//! One part is in flight at a time. Every issued load carries the session
//! generation; a result that arrives after the session changed is stale and
//! is dropped by the caller.

use bevy::gltf::Gltf;
use bevy::prelude::*;
use std::collections::VecDeque;

use super::progress::LoadProgress;
use crate::parts::{PartDescriptor, PartType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    /// No session started yet.
    #[default]
    Idle,
    Loading,
    /// Queue drained with at least one body part loaded.
    Ready,
    /// Queue drained without a body; nothing renders.
    Empty,
}

/// The single outstanding load.
#[derive(Debug, Clone)]
pub struct InFlight {
    /// Position of the part in the session's part list.
    pub index: usize,
    pub descriptor: PartDescriptor,
    pub generation: u64,
    pub handle: Handle<Gltf>,
}

/// How an in-flight load ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOutcome {
    Loaded(PartType),
    Failed,
}

#[derive(Resource, Debug, Default)]
pub struct LoadQueue {
    generation: u64,
    pending: VecDeque<(usize, PartDescriptor)>,
    in_flight: Option<InFlight>,
    progress: LoadProgress,
    phase: LoadPhase,
    loaded: usize,
    loaded_bodies: usize,
    failed: usize,
}

impl LoadQueue {
    /// Start loading `parts` for session `generation`. A load still in flight
    /// from an earlier session is kept until it lands so it can be discarded.
    pub fn begin(&mut self, generation: u64, parts: &[PartDescriptor]) {
        self.generation = generation;
        self.pending = parts.iter().cloned().enumerate().collect();
        self.progress = LoadProgress::new(parts.len());
        self.loaded = 0;
        self.loaded_bodies = 0;
        self.failed = 0;
        self.phase = LoadPhase::Loading;
        self.settle();
    }

    /// Next part to issue, if nothing is in flight.
    pub fn next_to_issue(&mut self) -> Option<(usize, PartDescriptor)> {
        if self.in_flight.is_some() {
            return None;
        }
        self.pending.pop_front()
    }

    pub fn mark_issued(&mut self, index: usize, descriptor: PartDescriptor, handle: Handle<Gltf>) {
        self.progress.report(index, 0.0);
        self.in_flight = Some(InFlight {
            index,
            descriptor,
            generation: self.generation,
            handle,
        });
    }

    pub fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    pub fn is_stale(&self, in_flight: &InFlight) -> bool {
        in_flight.generation != self.generation
    }

    /// Report progress for the in-flight part of the current session.
    pub fn report(&mut self, fraction: f32) {
        if let Some(in_flight) = &self.in_flight
            && in_flight.generation == self.generation
        {
            self.progress.report(in_flight.index, fraction);
        }
    }

    /// Close the in-flight load. Stale loads are returned without touching
    /// the current session's counters.
    pub fn finish(&mut self, outcome: PartOutcome) -> Option<InFlight> {
        let in_flight = self.in_flight.take()?;
        if in_flight.generation != self.generation {
            return Some(in_flight);
        }

        self.progress.complete(in_flight.index);
        match outcome {
            PartOutcome::Loaded(part_type) => {
                self.loaded += 1;
                if part_type == PartType::Body {
                    self.loaded_bodies += 1;
                }
            }
            PartOutcome::Failed => self.failed += 1,
        }
        self.settle();
        Some(in_flight)
    }

    pub fn is_drained(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_none()
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn percent(&self) -> f32 {
        self.progress.percent()
    }

    pub fn loaded(&self) -> usize {
        self.loaded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    fn settle(&mut self) {
        if self.phase != LoadPhase::Loading || !self.pending.is_empty() {
            return;
        }
        if self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.generation == self.generation)
        {
            return;
        }
        self.phase = if self.loaded_bodies == 0 {
            LoadPhase::Empty
        } else {
            LoadPhase::Ready
        };
    }
}
