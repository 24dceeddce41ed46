//! Per-frame simulation step
//!
//! Fixed order: movement, threat, ambient roll, win check. Terminal phases
//! stop the step from doing anything further.

use super::ambient::roll_ambient;
use super::movement::{CameraPose, KeyStates, MoveOutcome, resolve_movement};
use super::state::{GameEvent, GameSession, SessionPhase};

/// Host input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub keys: KeyStates,
    pub camera: CameraPose,
    /// Wall-clock timestamp (ms) driving the threat's retarget timer
    pub now_ms: f64,
}

/// Clamp a raw frame delta to `[0, max]`; garbage becomes 0
pub fn clamp_frame_delta(raw: f32, max: f32) -> f32 {
    if raw.is_nan() { 0.0 } else { raw.clamp(0.0, max) }
}

/// Advance an active session by one frame of `raw_dt` seconds
pub fn tick(session: &mut GameSession, input: &TickInput, raw_dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if !session.is_active() {
        return events;
    }

    let dt = clamp_frame_delta(raw_dt, session.tuning.max_frame_delta);
    session.frames += 1;
    session.elapsed += dt;

    // Player
    session.player.camera = input.camera;
    let outcome = resolve_movement(
        &input.keys,
        &input.camera,
        session.player.position,
        session.tuning.player_speed,
        dt,
        &session.probe,
        &session.level,
    );
    session.player.velocity = outcome.velocity();
    match outcome {
        MoveOutcome::Idle => {}
        MoveOutcome::Blocked { candidate, .. } => {
            log::debug!("Move to {:?} blocked", candidate);
            events.push(GameEvent::MoveBlocked { candidate });
        }
        MoveOutcome::Moved { to, .. } => {
            session.player.position = to;
            events.push(GameEvent::PlayerMoved {
                position: to,
                forward: input.camera.forward(),
            });
        }
    }

    // Threat
    let update = session.threat.update(
        &session.player,
        input.now_ms,
        dt,
        &mut session.rng,
        &session.tuning,
    );
    if let Some(target) = update.retargeted {
        events.push(GameEvent::ThreatRetargeted {
            target,
            awareness: session.threat.awareness,
        });
    }
    if update.caught {
        log::info!("Caught at distance {:.3}", update.distance);
        session.phase = SessionPhase::Lost;
        events.push(GameEvent::Caught {
            player_position: session.player.position,
        });
        return events;
    }

    // Ambience
    if let Some(event) = roll_ambient(session.player.position, &mut session.rng, &session.tuning) {
        events.push(event);
    }

    // Win condition
    let goal_distance = session.goal_distance();
    if goal_distance < session.tuning.win_radius {
        log::info!("Goal reached at distance {:.3}", goal_distance);
        session.phase = SessionPhase::Won;
        events.push(GameEvent::Escaped);
    }

    events
}
