//! Energy-based voice activity detection
//!
//! The detector classifies each frame as speech or silence by its mean
//! absolute magnitude, then debounces both directions:
//! - sustained speech (`start_ms`) is required before an utterance begins
//! - sustained silence (`silence_ms`) is required before it ends
//! - utterances shorter than `min_utterance_ms` end silently, without `End`
//!
//! It is single pass with no lookahead, so it adds no buffering delay.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audio::pcm::{frame_duration_ms, frame_energy};

/// Detector thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VadConfig {
    /// Mean absolute magnitude at or above which a frame counts as speech
    pub energy_threshold: f32,

    /// Continuous speech required before emitting `Begin`
    pub start_ms: u32,

    /// Continuous silence after speech required before the utterance closes
    pub silence_ms: u32,

    /// Utterances shorter than this close without emitting `End`
    pub min_utterance_ms: u32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            energy_threshold: 0.015,
            start_ms: 120,
            silence_ms: 450,
            min_utterance_ms: 280,
        }
    }
}

/// Utterance boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VadEvent {
    Begin,
    End,
}

/// Counter snapshot, mostly useful for diagnostics and tests
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct VadState {
    pub speaking: bool,
    pub speech_accumulated_ms: f64,
    pub silence_accumulated_ms: f64,
    pub utterance_duration_ms: f64,
}

pub struct VoiceActivityDetector {
    config: VadConfig,
    sample_rate: u32,
    state: VadState,
}

impl VoiceActivityDetector {
    pub fn new(config: VadConfig, sample_rate: u32) -> Self {
        Self {
            config,
            sample_rate,
            state: VadState::default(),
        }
    }

    pub fn config(&self) -> &VadConfig {
        &self.config
    }

    pub fn is_speaking(&self) -> bool {
        self.state.speaking
    }

    pub fn snapshot(&self) -> VadState {
        self.state
    }

    /// Clear all counters and the speaking flag
    pub fn reset(&mut self) {
        self.state = VadState::default();
    }

    /// Feed one frame; returns a boundary when one is crossed
    pub fn process(&mut self, samples: &[f32]) -> Option<VadEvent> {
        let energy = frame_energy(samples);
        let frame_ms = frame_duration_ms(samples.len(), self.sample_rate);
        let state = &mut self.state;

        state.utterance_duration_ms += frame_ms;

        if energy >= self.config.energy_threshold {
            state.speech_accumulated_ms += frame_ms;
            state.silence_accumulated_ms = 0.0;

            if !state.speaking && state.speech_accumulated_ms >= self.config.start_ms as f64 {
                state.speaking = true;
                state.utterance_duration_ms = 0.0;
                debug!("VAD begin (energy={:.4})", energy);
                return Some(VadEvent::Begin);
            }
        } else {
            state.silence_accumulated_ms += frame_ms;
            state.speech_accumulated_ms = 0.0;

            if state.speaking && state.silence_accumulated_ms >= self.config.silence_ms as f64 {
                let long_enough =
                    state.utterance_duration_ms >= self.config.min_utterance_ms as f64;
                debug!(
                    "VAD utterance closed after {:.0}ms (emitted={})",
                    state.utterance_duration_ms, long_enough
                );

                state.speaking = false;
                state.utterance_duration_ms = 0.0;
                state.silence_accumulated_ms = 0.0;

                if long_enough {
                    return Some(VadEvent::End);
                }
            }
        }

        None
    }
}
