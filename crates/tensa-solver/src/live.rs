//! Interactive relaxation session.
//!
//! The host drives the session with repeated synchronous `tick` calls
//! and decides whether to schedule the next one from the report.
//!
//! ```text
//!  UNINITIALIZED ──reset──▶ RESET ──tick(run)──▶ RUNNING ◀──tick(run)──┐
//!                             ▲                     │                   │
//!                             └──────reset──────────┤──tick(pause)──▶ PAUSED
//! ```

use serde::{Deserialize, Serialize};
use tensa_math::Vec3;
use tensa_types::{TensaError, TensaResult};

use crate::config::SolverConfig;
use crate::goal::{flatten, Goal, GoalNode, LabeledOutput};
use crate::hooks::StepHook;
use crate::system::PhysicalSystem;

/// Live session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Reset,
    Running,
    Paused,
}

impl SessionState {
    /// Lowercase state name.
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Reset => "reset",
            SessionState::Running => "running",
            SessionState::Paused => "paused",
        }
    }
}

/// Host controls sampled on every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    /// Step the system.
    pub run: bool,
    /// Hold the system. Wins over `run`.
    pub pause: bool,
}

impl Controls {
    /// Run without pausing.
    pub fn running() -> Self {
        Self {
            run: true,
            pause: false,
        }
    }

    /// Pause.
    pub fn paused() -> Self {
        Self {
            run: true,
            pause: true,
        }
    }
}

/// System summary published after every reset and tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemData {
    pub particle_count: usize,
    pub goal_count: usize,
    pub v_sum: f64,
    pub iterations: u32,
    pub converged: bool,
    pub state: SessionState,
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// System summary after the tick.
    pub data: SystemData,
    /// Steps performed during this tick.
    pub steps: u32,
    /// The host should schedule another tick (running, not converged).
    pub reschedule: bool,
}

/// A persistent system driven by host ticks.
pub struct LiveSession {
    config: SolverConfig,
    system: PhysicalSystem,
    goals: Vec<Box<dyn Goal>>,
    state: SessionState,
    converged: bool,
    hook: Option<Box<dyn StepHook>>,
}

impl LiveSession {
    /// Creates an uninitialized session after validating `config`.
    pub fn new(config: SolverConfig) -> TensaResult<Self> {
        config.validate()?;
        Ok(Self {
            system: PhysicalSystem::with_metric(config.metric),
            config,
            goals: Vec::new(),
            state: SessionState::Uninitialized,
            converged: false,
            hook: None,
        })
    }

    /// Attaches a hook that observes resets, steps and state changes.
    pub fn with_hook(mut self, hook: Box<dyn StepHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Detaches and returns the hook.
    pub fn take_hook(&mut self) -> Option<Box<dyn StepHook>> {
        self.hook.take()
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Active configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Rebuilds the system from scratch with a new goal list.
    pub fn reset<I>(&mut self, goals: I) -> TensaResult<SystemData>
    where
        I: IntoIterator<Item = GoalNode>,
    {
        let mut goals = flatten(goals);
        for goal in goals.iter_mut() {
            goal.topology_mut().unassign();
        }

        let mut system = PhysicalSystem::with_metric(self.config.metric);
        system.assign_all(&mut goals, self.config.tolerance)?;

        self.system = system;
        self.goals = goals;
        self.converged = false;
        tracing::info!(
            particles = self.system.particle_count(),
            goals = self.goals.len(),
            "live session reset"
        );
        if let Some(hook) = self.hook.as_mut() {
            hook.on_reset(self.system.particle_count(), self.goals.len());
        }
        self.set_state(SessionState::Reset);
        Ok(self.system_data())
    }

    /// Assigns one more goal into the running system without a reset.
    pub fn add_goal(&mut self, mut goal: Box<dyn Goal>) -> TensaResult<()> {
        self.ensure_initialized()?;
        self.system
            .assign_index(goal.as_mut(), self.config.tolerance)?;
        self.goals.push(goal);
        self.converged = false;
        Ok(())
    }

    /// Samples the controls and steps the system when running.
    pub fn tick(&mut self, controls: Controls) -> TensaResult<TickReport> {
        self.ensure_initialized()?;

        let mut steps = 0;
        if controls.pause {
            if self.state == SessionState::Running {
                self.set_state(SessionState::Paused);
            }
        } else if controls.run {
            self.set_state(SessionState::Running);
            for _ in 0..self.config.substeps {
                let result = self.system.step(&self.goals, self.config.parallel)?;
                if let Some(hook) = self.hook.as_mut() {
                    hook.on_step(&result);
                }
                steps += 1;
            }
            self.converged = self.config.is_converged(self.system.v_sum());
            tracing::debug!(
                iterations = self.system.iterations(),
                v_sum = self.system.v_sum(),
                converged = self.converged,
                "live tick"
            );
        }

        Ok(TickReport {
            data: self.system_data(),
            steps,
            reschedule: self.state == SessionState::Running && !self.converged,
        })
    }

    /// Current summary.
    pub fn system_data(&self) -> SystemData {
        SystemData {
            particle_count: self.system.particle_count(),
            goal_count: self.goals.len(),
            v_sum: self.system.v_sum(),
            iterations: self.system.iterations(),
            converged: self.converged,
            state: self.state,
        }
    }

    /// Current particle positions.
    pub fn positions(&self) -> &[Vec3] {
        self.system.positions()
    }

    /// Goal outputs from the current positions.
    pub fn outputs(&self) -> TensaResult<Vec<LabeledOutput>> {
        self.system.outputs(&self.goals)
    }

    /// The underlying system.
    pub fn system(&self) -> &PhysicalSystem {
        &self.system
    }

    fn ensure_initialized(&self) -> TensaResult<()> {
        if self.state == SessionState::Uninitialized {
            return Err(TensaError::SessionNotInitialized);
        }
        Ok(())
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state == state && state != SessionState::Reset {
            return;
        }
        self.state = state;
        if let Some(hook) = self.hook.as_mut() {
            hook.on_state(self.system.iterations(), state);
        }
    }
}
