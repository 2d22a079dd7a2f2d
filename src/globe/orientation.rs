// src/globe/orientation.rs

use super::{config::OrientationConfig, error::OrientationError};
use crate::math::{
    types::*,
    utils::{angles::angle_difference, constants::PI_OVER_2, easing::ease_in_out_cubic},
};
use bevy::log::{debug, info};

/// Toleranz, ab der eine Neigung als außerhalb der Grenze gilt.
const LIMIT_TOLERANCE: f32 = 1e-5;

/// Die drei Stufen der Animation zu einem Land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStage {
    /// Neigung auf null zurückdrehen, Drehung um die Polachse bleibt
    Vertical,
    /// Drehung um die Polachse auf den Ziel-Längengrad
    Longitude,
    /// Neigung auf den (begrenzten) Ziel-Breitengrad
    Latitude,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrientationPhase {
    Idle,
    Dragging,
    /// Nachlaufen nach dem Loslassen, `velocity` = (Gier, Neigung) pro Tick
    InertiaDecay { velocity: Vec2 },
    /// Rückfederung der Neigung auf `limit`
    SpringCorrecting {
        limit: f32,
        velocity: f32,
        yaw_velocity: f32,
    },
    AnimatingToCountry(AnimationStage),
}

/// Eine laufende Animationsstufe. `start` ist immer die Orientierung beim Start der Stufe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTask {
    pub stage: AnimationStage,
    pub start: Quat,
    pub target: Quat,
    pub start_time: f32,
    pub duration: f32,
}

impl AnimationTask {
    /// Fortschritt in [0, 1] zum Zeitpunkt `now`.
    pub fn progress(&self, now: f32) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start_time) / self.duration).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TargetAngles {
    yaw: f32,
    pitch: f32,
}

/// Setzt eine Orientierung aus Gier (um Y) und Neigung (um X) zusammen: `Rx(pitch) · Ry(yaw)`.
pub fn compose(yaw: f32, pitch: f32) -> Quat {
    Quat::from_rotation_x(pitch) * Quat::from_rotation_y(yaw)
}

/// Neigung einer Orientierung, abgelesen an der gedrehten Polachse.
pub fn pitch_of(orientation: Quat) -> f32 {
    let pole = orientation * Vec3::Y;
    pole.z.atan2(pole.y)
}

/// Gier einer Orientierung, nachdem die Neigung herausgedreht wurde.
pub fn yaw_of(orientation: Quat) -> f32 {
    let level = Quat::from_rotation_x(-pitch_of(orientation)) * orientation;
    let forward = level * Vec3::Z;
    forward.x.atan2(forward.z)
}

/// Gier und Neigung, die den Punkt `center` auf die +Z-Achse (zur Kamera) drehen.
pub fn target_angles(center: Vec3) -> Option<(f32, f32)> {
    let direction = center.try_normalize()?;
    let theta = direction.x.atan2(direction.z);
    let phi = direction.y.clamp(-1.0, 1.0).acos();
    Some((-theta, PI_OVER_2 - phi))
}

/// Zustandsmaschine für die Orientierung des Globus.
///
/// Alle zeitabhängigen Schritte laufen über [`OrientationController::step`],
/// einmal pro Frame. Die Neigung ist auf ±`max_polar_angle` begrenzt;
/// Ziehen darüber hinaus ist gedämpft möglich und federt danach zurück.
#[derive(Debug, Clone)]
pub struct OrientationController {
    config: OrientationConfig,
    orientation: Quat,
    phase: OrientationPhase,
    task: Option<AnimationTask>,
    target: Option<TargetAngles>,
    controls_enabled: bool,
    zoom: f32,
    drag_velocity: Vec2,
}

impl OrientationController {
    /// Erstellt einen neuen Controller mit der Startneigung `initial_tilt` (Radiant).
    pub fn new(config: OrientationConfig, initial_tilt: f32) -> Self {
        let limit = config.max_polar_angle();
        Self {
            orientation: compose(0.0, initial_tilt.clamp(-limit, limit)),
            phase: OrientationPhase::Idle,
            task: None,
            target: None,
            controls_enabled: true,
            zoom: config
                .initial_zoom
                .clamp(config.min_zoom, config.max_zoom),
            drag_velocity: Vec2::ZERO,
            config,
        }
    }

    pub fn config(&self) -> &OrientationConfig {
        &self.config
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn phase(&self) -> OrientationPhase {
        self.phase
    }

    pub fn task(&self) -> Option<&AnimationTask> {
        self.task.as_ref()
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pitch(&self) -> f32 {
        pitch_of(self.orientation)
    }

    pub fn yaw(&self) -> f32 {
        yaw_of(self.orientation)
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, OrientationPhase::AnimatingToCountry(_))
    }

    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    pub fn set_controls_enabled(&mut self, enabled: bool) {
        self.controls_enabled = enabled;
        if !enabled && self.phase == OrientationPhase::Dragging {
            self.phase = OrientationPhase::Idle;
        }
    }

    /// Nutzereingaben werden nur angenommen, wenn die Steuerung aktiv ist
    /// und keine Länder-Animation läuft.
    pub fn accepts_input(&self) -> bool {
        self.controls_enabled && !self.is_animating()
    }

    /// Startet die dreistufige Animation, die `center` zur Kamera dreht.
    ///
    /// Während einer laufenden Animation wird die Anfrage abgelehnt. Ziehen,
    /// Trägheit und Rückfederung werden dagegen abgebrochen.
    pub fn orient_to(&mut self, center: Vec3, now: f32) -> Result<(), OrientationError> {
        if self.is_animating() {
            return Err(OrientationError::AnimationInFlight);
        }
        let (yaw, pitch) = target_angles(center).ok_or(OrientationError::DegenerateCenter)?;

        self.target = Some(TargetAngles { yaw, pitch });
        self.drag_velocity = Vec2::ZERO;
        let level = compose(yaw_of(self.orientation), 0.0);
        self.start_stage(AnimationStage::Vertical, level, now);
        Ok(())
    }

    pub fn begin_drag(&mut self) -> bool {
        if !self.accepts_input() {
            return false;
        }
        self.phase = OrientationPhase::Dragging;
        self.drag_velocity = Vec2::ZERO;
        true
    }

    /// Dreht den Globus um eine Mausbewegung in Pixeln (x = Gier, y = Neigung).
    pub fn drag(&mut self, delta: Vec2) -> bool {
        if self.phase != OrientationPhase::Dragging || !self.accepts_input() {
            return false;
        }
        let rotation = delta * self.config.drag_sensitivity;
        self.rotate_elastic(rotation);
        self.drag_velocity = rotation;
        true
    }

    /// Beendet das Ziehen; die letzte Bewegung läuft als Trägheit nach.
    pub fn end_drag(&mut self) {
        if self.phase == OrientationPhase::Dragging {
            self.phase = OrientationPhase::InertiaDecay {
                velocity: self.drag_velocity,
            };
        }
    }

    /// Dreht den Globus um einen festen Winkel (Tastatur), ohne Nachlaufen.
    pub fn nudge(&mut self, rotation: Vec2) -> bool {
        if !self.accepts_input() || self.phase == OrientationPhase::Dragging {
            return false;
        }
        self.rotate_elastic(rotation);
        self.phase = OrientationPhase::Idle;
        true
    }

    /// Ändert den Kameraabstand und begrenzt ihn auf `[min_zoom, max_zoom]`.
    pub fn zoom_by(&mut self, delta: f32) -> bool {
        if !self.accepts_input() {
            return false;
        }
        self.zoom = (self.zoom + delta).clamp(self.config.min_zoom, self.config.max_zoom);
        true
    }

    /// Führt genau einen Tick der aktiven Phase aus.
    pub fn step(&mut self, now: f32) {
        match self.phase {
            OrientationPhase::Idle => {
                if let Some(limit) = self.violated_limit() {
                    self.phase = OrientationPhase::SpringCorrecting {
                        limit,
                        velocity: 0.0,
                        yaw_velocity: 0.0,
                    };
                }
            }
            OrientationPhase::Dragging => {}
            OrientationPhase::InertiaDecay { velocity } => self.step_inertia(velocity),
            OrientationPhase::SpringCorrecting {
                limit,
                velocity,
                yaw_velocity,
            } => self.step_spring(limit, velocity, yaw_velocity),
            OrientationPhase::AnimatingToCountry(_) => self.step_animation(now),
        }
    }

    fn step_inertia(&mut self, velocity: Vec2) {
        let velocity = velocity * self.config.rotation_damping;
        self.rotate_elastic(velocity);

        self.phase = match self.violated_limit() {
            Some(limit) => OrientationPhase::SpringCorrecting {
                limit,
                velocity: 0.0,
                yaw_velocity: velocity.x,
            },
            None if velocity.abs().max_element() < self.config.inertia_epsilon => {
                OrientationPhase::Idle
            }
            None => OrientationPhase::InertiaDecay { velocity },
        };
    }

    fn step_spring(&mut self, limit: f32, velocity: f32, yaw_velocity: f32) {
        let displacement = pitch_of(self.orientation) - limit;
        let velocity =
            (velocity - displacement * self.config.spring_strength) * self.config.spring_damping;
        let yaw_velocity = yaw_velocity * self.config.rotation_damping;
        let yaw = yaw_of(self.orientation) + yaw_velocity;

        if velocity.abs() < self.config.spring_epsilon
            && yaw_velocity.abs() < self.config.inertia_epsilon
        {
            let max = self.config.max_polar_angle();
            self.orientation = compose(yaw, (limit + velocity).clamp(-max, max));
            self.phase = OrientationPhase::Idle;
            return;
        }

        self.orientation = compose(yaw, limit + velocity);
        self.phase = OrientationPhase::SpringCorrecting {
            limit,
            velocity,
            yaw_velocity,
        };
    }

    fn step_animation(&mut self, now: f32) {
        let Some(task) = self.task else {
            self.phase = OrientationPhase::Idle;
            return;
        };

        let progress = task.progress(now);
        self.orientation = task
            .start
            .slerp(task.target, ease_in_out_cubic(progress))
            .normalize();
        if progress < 1.0 {
            return;
        }
        self.orientation = task.target;

        let Some(target) = self.target else {
            self.finish_animation();
            return;
        };
        match task.stage {
            AnimationStage::Vertical => {
                let held_pitch = pitch_of(self.orientation);
                self.start_stage(
                    AnimationStage::Longitude,
                    compose(target.yaw, held_pitch),
                    now,
                );
            }
            AnimationStage::Longitude => {
                let limit = self.config.max_polar_angle();
                let desired = target.pitch.clamp(-limit, limit);
                let delta = angle_difference(pitch_of(self.orientation), desired);
                let tilted = Quat::from_rotation_x(delta) * self.orientation;
                self.start_stage(AnimationStage::Latitude, tilted, now);
            }
            AnimationStage::Latitude => self.finish_animation(),
        }
    }

    fn start_stage(&mut self, stage: AnimationStage, target: Quat, now: f32) {
        debug!("Globe animation stage {stage:?} started at {now:.3}s");
        self.task = Some(AnimationTask {
            stage,
            start: self.orientation,
            target,
            start_time: now,
            duration: self.config.stage_duration,
        });
        self.phase = OrientationPhase::AnimatingToCountry(stage);
    }

    fn finish_animation(&mut self) {
        self.task = None;
        self.target = None;
        self.phase = OrientationPhase::Idle;
        info!(
            "Globe oriented: yaw {:.1}°, pitch {:.1}°",
            self.yaw().to_degrees(),
            self.pitch().to_degrees()
        );
    }

    /// Dreht um `rotation` (Gier, Neigung). Jenseits der Neigungsgrenze wirkt
    /// die Bewegung nur noch mit `elasticity`, höchstens bis `max_overshoot`.
    fn rotate_elastic(&mut self, rotation: Vec2) {
        let yaw = yaw_of(self.orientation) + rotation.x;
        let pitch = self.elastic_pitch(pitch_of(self.orientation), rotation.y);
        self.orientation = compose(yaw, pitch);
    }

    fn elastic_pitch(&self, pitch: f32, delta: f32) -> f32 {
        let limit = self.config.max_polar_angle();
        let hard_limit = limit + self.config.max_overshoot();
        let next = pitch + delta;

        // Innerhalb der Grenze oder zurück zur Mitte: ungedämpft
        if next.abs() <= limit || next.signum() != delta.signum() {
            return next.clamp(-hard_limit, hard_limit);
        }

        let boundary = limit.copysign(next);
        let resisted = if (pitch - boundary) * next.signum() > 0.0 {
            pitch + delta * self.config.elasticity
        } else {
            boundary + (next - boundary) * self.config.elasticity
        };
        resisted.clamp(-hard_limit, hard_limit)
    }

    fn violated_limit(&self) -> Option<f32> {
        let limit = self.config.max_polar_angle();
        let pitch = pitch_of(self.orientation);
        if pitch > limit + LIMIT_TOLERANCE {
            Some(limit)
        } else if pitch < -limit - LIMIT_TOLERANCE {
            Some(-limit)
        } else {
            None
        }
    }
}
