//! The simulation loop: owns particles and attractors and advances frames.
//!
//! A frame dispatches the queued input events, reconciles the particle count
//! toward its target, then pulls every particle through the force field and
//! integrator. Rendering is left to the caller, which reads the state back
//! through the accessors after [`GravitySim::frame`] returns.

use glam::DVec2;
use serde_json::Value;
use tracing::{debug, trace};

use crate::attractor::Attractor;
use crate::config::{GravityParams, MAX_PARTICLES};
use crate::error::EngineError;
use crate::input::InputEvent;
use crate::particle::Particle;
use crate::prng::Xorshift64;
use crate::ui::{ControlPanel, PanelAction};

/// Loop lifecycle. `Stopped` is terminal and only reached through
/// [`InputEvent::Quit`] or [`GravitySim::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

pub struct GravitySim {
    bounds: DVec2,
    params: GravityParams,
    particles: Vec<Particle>,
    attractors: Vec<Attractor>,
    rng: Xorshift64,
    target_count: usize,
    panel: Option<ControlPanel>,
    state: LoopState,
    frame: u64,
}

impl GravitySim {
    /// Creates a running simulation with `params.particle_count` particles
    /// spawned at random positions.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero,
    /// or the validation error from [`GravityParams::validate`].
    pub fn new(
        width: usize,
        height: usize,
        seed: u64,
        params: GravityParams,
    ) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        width
            .checked_mul(height)
            .ok_or(EngineError::InvalidDimensions)?;
        params.validate()?;

        let mut sim = Self {
            bounds: DVec2::new(width as f64, height as f64),
            params,
            particles: Vec::with_capacity(params.particle_count),
            attractors: Vec::new(),
            rng: Xorshift64::new(seed),
            target_count: params.particle_count,
            panel: None,
            state: LoopState::Running,
            frame: 0,
        };
        sim.reconcile_particle_count();
        Ok(sim)
    }

    /// Builds a simulation from a flat JSON params object layered over `base`.
    pub fn from_json(
        width: usize,
        height: usize,
        seed: u64,
        base: GravityParams,
        json_params: &Value,
    ) -> Result<Self, EngineError> {
        Self::new(width, height, seed, GravityParams::from_json(base, json_params)?)
    }

    /// Installs the standard control panel, seeded with the current target.
    pub fn with_control_panel(mut self) -> Self {
        self.panel = Some(ControlPanel::standard(self.bounds.x, self.target_count));
        self
    }

    pub fn width(&self) -> f64 {
        self.bounds.x
    }

    pub fn height(&self) -> f64 {
        self.bounds.y
    }

    pub fn bounds(&self) -> DVec2 {
        self.bounds
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn attractors(&self) -> &[Attractor] {
        &self.attractors
    }

    pub fn gravity_params(&self) -> &GravityParams {
        &self.params
    }

    pub fn panel(&self) -> Option<&ControlPanel> {
        self.panel.as_ref()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Number of completed frames.
    pub fn frame_index(&self) -> u64 {
        self.frame
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    /// Appends an attractor. Non-finite positions are dropped.
    pub fn add_attractor(&mut self, position: DVec2) {
        if !position.is_finite() {
            debug!(?position, "ignoring non-finite attractor position");
            return;
        }
        self.attractors.push(Attractor::new(position));
        debug!(
            x = position.x,
            y = position.y,
            total = self.attractors.len(),
            "attractor added"
        );
    }

    /// Appends every position, typically the output of a pattern generator.
    pub fn extend_attractors<I: IntoIterator<Item = DVec2>>(&mut self, positions: I) {
        for p in positions {
            self.add_attractor(p);
        }
    }

    pub fn clear_attractors(&mut self) {
        debug!(removed = self.attractors.len(), "attractors cleared");
        self.attractors.clear();
    }

    /// Drops every attractor and particle. The next reconcile refills the
    /// particle set up to the current target.
    pub fn clear_all(&mut self) {
        debug!(
            attractors = self.attractors.len(),
            particles = self.particles.len(),
            "cleared all"
        );
        self.attractors.clear();
        self.particles.clear();
    }

    /// Sets the particle target, capped at [`MAX_PARTICLES`]. With a control
    /// panel installed the slider range bounds it instead, so the slider and
    /// the particle set always agree.
    pub fn set_target_count(&mut self, count: usize) {
        let mut count = count.min(MAX_PARTICLES);
        if let Some(panel) = self.panel.as_mut() {
            panel.set_target_count(count);
            count = panel.target_count();
        }
        self.target_count = count;
    }

    /// Spawns or truncates particles until the set matches the target.
    /// Truncation keeps the oldest particles.
    pub fn reconcile_particle_count(&mut self) {
        let current = self.particles.len();
        let target = self.target_count;
        if current < target {
            let profile = self.params.spawn;
            let bounds = self.bounds;
            let rng = &mut self.rng;
            self.particles
                .extend((current..target).map(|_| Particle::spawn(rng, bounds, &profile)));
            trace!(added = target - current, total = target, "particles spawned");
        } else if current > target {
            self.particles.truncate(target);
            trace!(removed = current - target, total = target, "particles removed");
        }
    }

    /// Applies one input event.
    pub fn handle_event(&mut self, event: &InputEvent) {
        if self.state == LoopState::Stopped {
            return;
        }
        match *event {
            InputEvent::Quit => {
                self.stop();
                return;
            }
            InputEvent::SetTargetCount { count } => self.set_target_count(count),
            _ => {}
        }

        let mut on_chrome = false;
        if let Some(panel) = self.panel.as_mut() {
            on_chrome = event.position().is_some_and(|p| panel.covers(p));
            let actions = panel.handle(event);
            for action in actions {
                self.apply(action);
            }
        }

        if let InputEvent::MouseDown { position } = *event {
            if !on_chrome {
                self.add_attractor(position);
            }
        }
    }

    fn apply(&mut self, action: PanelAction) {
        match action {
            PanelAction::SetTargetCount(n) => self.target_count = n.min(MAX_PARTICLES),
            PanelAction::ClearAttractors => self.clear_attractors(),
            PanelAction::ClearAll => self.clear_all(),
        }
    }

    /// Advances every particle one timestep under the current attractors.
    pub fn step(&mut self) {
        let law = self.params.law;
        let motion = self.params.motion;
        let bounds = self.bounds;
        let attractors = &self.attractors;
        for particle in &mut self.particles {
            let acceleration = law.acceleration(particle.position, attractors);
            particle.integrate(acceleration, &motion, bounds);
        }
    }

    /// Runs one full frame: events, reconcile, physics.
    ///
    /// A `Quit` among `events` stops the loop immediately; later events and
    /// the physics step are skipped. Frames after that are no-ops.
    pub fn frame<I: IntoIterator<Item = InputEvent>>(&mut self, events: I) -> LoopState {
        if self.state == LoopState::Stopped {
            return LoopState::Stopped;
        }
        for event in events {
            self.handle_event(&event);
            if self.state == LoopState::Stopped {
                return LoopState::Stopped;
            }
        }
        self.reconcile_particle_count();
        self.step();
        self.frame += 1;
        LoopState::Running
    }

    /// Runs one frame with no input.
    pub fn advance(&mut self) -> LoopState {
        self.frame(std::iter::empty())
    }

    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            debug!(frame = self.frame, "simulation stopped");
        }
        self.state = LoopState::Stopped;
    }

    /// Current parameters as a flat JSON object.
    pub fn params(&self) -> Value {
        self.params.params()
    }

    pub fn param_schema(&self) -> Value {
        self.params.param_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern;
    use serde_json::json;

    fn sim(count: usize) -> GravitySim {
        let params = GravityParams {
            particle_count: count,
            ..GravityParams::classic()
        };
        GravitySim::new(800, 600, 42, params).unwrap()
    }

    fn enhanced(count: usize) -> GravitySim {
        let params = GravityParams {
            particle_count: count,
            ..GravityParams::enhanced()
        };
        GravitySim::new(2560, 1080, 7, params)
            .unwrap()
            .with_control_panel()
    }

    fn down(x: f64, y: f64) -> InputEvent {
        InputEvent::click(x, y)
    }

    fn motion(x: f64, y: f64) -> InputEvent {
        InputEvent::MouseMove { position: DVec2::new(x, y) }
    }

    // ---- Construction ----

    #[test]
    fn new_spawns_configured_particle_count() {
        let s = sim(250);
        assert_eq!(s.particles().len(), 250);
        assert!(s.attractors().is_empty());
        assert_eq!(s.state(), LoopState::Running);
    }

    #[test]
    fn new_rejects_zero_dimensions() {
        let p = GravityParams::classic();
        assert!(matches!(
            GravitySim::new(0, 10, 1, p),
            Err(EngineError::InvalidDimensions)
        ));
        assert!(GravitySim::new(10, 0, 1, p).is_err());
        assert!(GravitySim::new(usize::MAX, 2, 1, p).is_err());
    }

    #[test]
    fn new_rejects_invalid_params() {
        let mut p = GravityParams::classic();
        p.law.distance_floor = 0.0;
        assert!(matches!(
            GravitySim::new(100, 100, 1, p),
            Err(EngineError::InvalidParam { .. })
        ));
    }

    #[test]
    fn from_json_layers_over_base() {
        let s = GravitySim::from_json(
            100,
            100,
            1,
            GravityParams::tidal(),
            &json!({"particle_count": 12}),
        )
        .unwrap();
        assert_eq!(s.particles().len(), 12);
        assert_eq!(s.gravity_params().law.exponent, 3.0);
    }

    #[test]
    fn spawned_particles_lie_on_screen() {
        let s = sim(1000);
        for p in s.particles() {
            assert!((0.0..800.0).contains(&p.position.x));
            assert!((0.0..600.0).contains(&p.position.y));
        }
    }

    // ---- Events ----

    #[test]
    fn click_adds_attractor_without_panel() {
        let mut s = sim(0);
        s.frame([down(10.0, 20.0), down(30.0, 5.0)]);
        assert_eq!(
            s.attractors(),
            &[
                Attractor::new(DVec2::new(10.0, 20.0)),
                Attractor::new(DVec2::new(30.0, 5.0))
            ]
        );
    }

    #[test]
    fn click_on_panel_region_never_adds_attractor() {
        let mut s = enhanced(0);
        s.frame([down(1800.0, 50.0), down(60.0, 55.0), down(300.0, 60.0)]);
        assert!(s.attractors().is_empty());
        s.frame([down(1800.0, 400.0)]);
        assert_eq!(s.attractors().len(), 1);
    }

    #[test]
    fn click_on_panel_bottom_edge_is_chrome() {
        let mut s = enhanced(0);
        s.frame([down(300.0, 100.0)]);
        assert!(s.attractors().is_empty());
        s.frame([down(300.0, 100.25)]);
        assert_eq!(s.attractors().len(), 1);
    }

    #[test]
    fn non_finite_click_is_ignored() {
        let mut s = sim(0);
        s.handle_event(&down(f64::NAN, 3.0));
        assert!(s.attractors().is_empty());
    }

    #[test]
    fn quit_stops_loop_and_skips_remaining_work() {
        let mut s = sim(10);
        let before = s.particles().to_vec();
        let state = s.frame([InputEvent::Quit, down(1.0, 1.0)]);
        assert_eq!(state, LoopState::Stopped);
        assert!(s.attractors().is_empty());
        assert_eq!(s.particles(), before.as_slice());
        assert_eq!(s.frame_index(), 0);
    }

    #[test]
    fn frames_after_stop_are_no_ops() {
        let mut s = sim(10);
        s.stop();
        let before = s.particles().to_vec();
        assert_eq!(s.frame([down(5.0, 5.0)]), LoopState::Stopped);
        assert_eq!(s.particles(), before.as_slice());
        assert!(s.attractors().is_empty());
    }

    #[test]
    fn reset_button_clears_attractors_only() {
        let mut s = enhanced(20);
        s.extend_attractors(pattern::line(DVec2::new(0.0, 500.0), DVec2::new(100.0, 500.0), 5));
        s.frame([down(300.0, 60.0)]);
        assert!(s.attractors().is_empty());
        assert_eq!(s.particles().len(), 20);
    }

    #[test]
    fn clear_all_refills_particles_to_target_in_same_frame() {
        let mut s = enhanced(20);
        s.add_attractor(DVec2::new(900.0, 900.0));
        s.frame([down(450.0, 60.0)]);
        assert!(s.attractors().is_empty());
        assert_eq!(s.particles().len(), 20);
    }

    #[test]
    fn slider_drag_changes_particle_count() {
        let mut s = enhanced(500);
        s.frame([down(60.0, 55.0), motion(100.0, 55.0)]);
        // (100 - 50) / 200 * 2000
        assert_eq!(s.target_count(), 500);
        s.frame([motion(70.0, 55.0)]);
        assert_eq!(s.target_count(), 200);
        assert_eq!(s.particles().len(), 200);
        s.frame([motion(250.0, 55.0)]);
        assert_eq!(s.particles().len(), 2000);
    }

    #[test]
    fn set_target_count_event_updates_slider() {
        let mut s = enhanced(10);
        s.frame([InputEvent::SetTargetCount { count: 40 }]);
        assert_eq!(s.particles().len(), 40);
        assert_eq!(s.panel().unwrap().target_count(), 40);
    }

    #[test]
    fn set_target_count_beyond_slider_follows_slider() {
        let mut s = enhanced(10);
        s.frame([InputEvent::SetTargetCount { count: 5000 }]);
        assert_eq!(s.target_count(), 2000);
        assert_eq!(s.particles().len(), 2000);
        assert_eq!(s.panel().unwrap().target_count(), 2000);
    }

    #[test]
    fn set_target_count_without_panel_caps_at_max() {
        let mut s = sim(0);
        s.set_target_count(MAX_PARTICLES + 5);
        assert_eq!(s.target_count(), MAX_PARTICLES);
    }

    #[test]
    fn truncation_keeps_oldest_particles() {
        let mut s = sim(10);
        let first_three: Vec<DVec2> = s.particles()[..3].iter().map(|p| p.position).collect();
        s.set_target_count(3);
        s.reconcile_particle_count();
        let kept: Vec<DVec2> = s.particles().iter().map(|p| p.position).collect();
        assert_eq!(kept, first_three);
    }

    // ---- Physics ----

    #[test]
    fn step_without_attractors_is_free_flight_with_damping() {
        let mut s = sim(1);
        let p0 = s.particles()[0].clone();
        s.step();
        let p1 = &s.particles()[0];
        let expected_v = p0.velocity * 0.97;
        assert!((p1.velocity - expected_v).length() < 1e-12);
    }

    #[test]
    fn particles_stay_on_screen_over_many_frames() {
        let mut s = sim(300);
        s.extend_attractors(pattern::spiral(DVec2::new(400.0, 300.0), 3, 8, 30.0));
        for _ in 0..200 {
            s.advance();
        }
        for p in s.particles() {
            assert!((0.0..800.0).contains(&p.position.x), "x = {}", p.position.x);
            assert!((0.0..600.0).contains(&p.position.y), "y = {}", p.position.y);
        }
        assert_eq!(s.frame_index(), 200);
    }

    #[test]
    fn attractor_pulls_nearby_particle_toward_it() {
        let mut s = sim(0);
        s.add_attractor(DVec2::new(100.0, 100.0));
        s.particles.push(Particle::at_rest(DVec2::new(100.0, 0.0)));
        s.target_count = 1;
        s.advance();
        assert!(s.particles()[0].velocity.y > 0.0);
    }

    #[test]
    fn same_seed_and_events_are_deterministic() {
        let script = [down(200.0, 200.0), down(600.0, 400.0)];
        let mut a = sim(200);
        let mut b = sim(200);
        a.frame(script);
        b.frame(script);
        for _ in 0..50 {
            a.advance();
            b.advance();
        }
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn different_seeds_spawn_differently() {
        let p = GravityParams::classic();
        let a = GravitySim::new(100, 100, 1, p).unwrap();
        let b = GravitySim::new(100, 100, 2, p).unwrap();
        assert_ne!(a.particles()[0].position, b.particles()[0].position);
    }

    #[test]
    fn params_and_schema_agree() {
        let s = sim(5);
        let params = s.params();
        let schema = s.param_schema();
        for key in params.as_object().unwrap().keys() {
            assert!(schema.get(key).is_some(), "schema missing {key}");
        }
    }
}
