//! The restart policy engine.
//!
//! A pure state machine: one call per service per tick, fed the probe
//! outcome, returning what the loop should do (restart or nothing) and which
//! alerts to raise. No I/O happens here, which is what makes the transition
//! table testable against the invariants:
//!
//! - exactly one of the consecutive counters is non-zero after any probe;
//! - `restart_count` never exceeds the configured maximum while
//!   `auto_restart` holds, and once spent the service is exhausted until a
//!   manual restart;
//! - the budget re-arms only after a full healthy streak, never on a single
//!   healthy probe, which is what prevents restart-storm oscillation;
//! - one unreachable alert per unbroken failure episode.

use chrono::{DateTime, Utc};
use meshwatch_types::{AlertKind, HealthState, ServicePhase};

use crate::config::PolicyConfig;
use crate::probe::ProbeOutcome;
use crate::supervisor::state::{AlertEpisode, ServiceRuntimeState};

/// What the supervisor loop must do after one evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyAction {
    /// Nothing to execute this tick.
    None,
    /// Invoke the process manager. The attempt is already counted and
    /// stamped; a spawn failure needs no further bookkeeping.
    Restart,
}

/// Result of evaluating one probe outcome against one service's state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub action: PolicyAction,
    pub alerts: Vec<AlertKind>,
}

impl Decision {
    fn none() -> Self {
        Self {
            action: PolicyAction::None,
            alerts: Vec::new(),
        }
    }
}

/// Advance one service's state by one probe outcome. Evaluated once per tick
/// per service, always from the loop's serialization point.
pub fn evaluate(
    state: &mut ServiceRuntimeState,
    auto_restart: bool,
    outcome: &ProbeOutcome,
    now: DateTime<Utc>,
    config: &PolicyConfig,
) -> Decision {
    let mut decision = Decision::none();
    let previous = state.health;
    let observed = outcome.health();

    // Leaving the unreachable state ends the failure episode, whatever it
    // transitions into.
    if previous == HealthState::Unreachable && observed != HealthState::Unreachable {
        decision.alerts.push(AlertKind::Recovered);
        state.episode = AlertEpisode::NonePending;
    }

    state.health = observed;

    if !outcome.is_failure() {
        state.consecutive_healthy += 1;
        state.consecutive_failures = 0;

        if matches!(state.phase, ServicePhase::Starting | ServicePhase::Restarting) {
            state.phase = ServicePhase::Running;
        }

        // Exhaustion is terminal: a healthy streak re-arms a live budget,
        // but only a manual restart may leave the exhausted phase.
        if state.phase != ServicePhase::Exhausted
            && state.consecutive_healthy >= config.healthy_streak
        {
            state.restart_count = 0;
            state.episode = AlertEpisode::NonePending;
        }

        return decision;
    }

    state.consecutive_failures += 1;
    state.consecutive_healthy = 0;

    if observed == HealthState::Unreachable && state.episode == AlertEpisode::NonePending {
        decision.alerts.push(AlertKind::BecameUnreachable);
        state.episode = AlertEpisode::Alerted;
    }

    if !auto_restart {
        return decision;
    }

    // Cooldown gate: a restart attempt is eligible only once the previous
    // one has had its full window to prove itself.
    if let Some(last) = state.last_restart_at {
        if now - last < config.cooldown() {
            return decision;
        }
    }

    if state.restart_count < config.max_restarts {
        state.restart_count += 1;
        state.last_restart_at = Some(now);
        state.phase = ServicePhase::Restarting;
        decision.action = PolicyAction::Restart;
    } else if state.phase != ServicePhase::Exhausted {
        state.phase = ServicePhase::Exhausted;
        decision.alerts.push(AlertKind::RestartExhausted);
    }

    decision
}

/// Re-arm an exhausted (or merely tired) service for a manual restart: the
/// counter resets before the attempt, then the attempt itself is recorded
/// exactly as if the policy had triggered it, so the next tick's cooldown
/// math stays consistent.
pub fn arm_manual_restart(state: &mut ServiceRuntimeState, now: DateTime<Utc>) {
    state.restart_count = 1;
    state.last_restart_at = Some(now);
    state.phase = ServicePhase::Restarting;
    state.consecutive_healthy = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn config() -> PolicyConfig {
        PolicyConfig::default()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
    }

    fn unreachable() -> ProbeOutcome {
        ProbeOutcome::Unreachable("connection failed".into())
    }

    /// Run `n` ticks with the same outcome, spacing them a tick apart, and
    /// collect every decision.
    fn run_ticks(
        state: &mut ServiceRuntimeState,
        auto_restart: bool,
        outcome: ProbeOutcome,
        n: usize,
        start: DateTime<Utc>,
        spacing: Duration,
    ) -> Vec<Decision> {
        (0..n)
            .map(|i| {
                let now = start + spacing * i as i32;
                evaluate(state, auto_restart, &outcome, now, &config())
            })
            .collect()
    }

    #[test]
    fn test_no_restart_without_auto_restart() {
        let mut state = ServiceRuntimeState::default();
        let decisions = run_ticks(
            &mut state,
            false,
            unreachable(),
            20,
            t0(),
            Duration::seconds(30),
        );

        assert!(decisions.iter().all(|d| d.action == PolicyAction::None));
        assert_eq!(state.restart_count, 0);
        assert_eq!(state.health, HealthState::Unreachable);
        assert_eq!(state.consecutive_failures, 20);
    }

    #[test]
    fn test_failed_probe_triggers_restart_and_counts() {
        let mut state = ServiceRuntimeState::default();

        // Three unreachable probes, 30s apart, no prior restarts: the first
        // eligible tick already issues the restart.
        let d1 = evaluate(&mut state, true, &unreachable(), t0(), &config());
        assert_eq!(d1.action, PolicyAction::Restart);
        assert_eq!(state.restart_count, 1);
        assert_eq!(state.phase, ServicePhase::Restarting);
        assert_eq!(state.last_restart_at, Some(t0()));
    }

    #[test]
    fn test_cooldown_blocks_back_to_back_restarts() {
        let mut state = ServiceRuntimeState::default();

        let d1 = evaluate(&mut state, true, &unreachable(), t0(), &config());
        assert_eq!(d1.action, PolicyAction::Restart);

        // 30s later: still inside the 60s window.
        let d2 = evaluate(
            &mut state,
            true,
            &unreachable(),
            t0() + Duration::seconds(30),
            &config(),
        );
        assert_eq!(d2.action, PolicyAction::None);
        assert_eq!(state.restart_count, 1);

        // 60s later: eligible again.
        let d3 = evaluate(
            &mut state,
            true,
            &unreachable(),
            t0() + Duration::seconds(60),
            &config(),
        );
        assert_eq!(d3.action, PolicyAction::Restart);
        assert_eq!(state.restart_count, 2);
    }

    #[test]
    fn test_exhaustion_after_max_attempts() {
        let mut state = ServiceRuntimeState::default();
        let mut restarts = 0;
        let mut exhausted_alerts = 0;

        for i in 0..12 {
            let now = t0() + Duration::seconds(60 * i);
            let d = evaluate(&mut state, true, &unreachable(), now, &config());
            if d.action == PolicyAction::Restart {
                restarts += 1;
            }
            exhausted_alerts += d
                .alerts
                .iter()
                .filter(|a| **a == AlertKind::RestartExhausted)
                .count();
        }

        assert_eq!(restarts, 3);
        assert_eq!(state.restart_count, 3);
        assert_eq!(state.phase, ServicePhase::Exhausted);
        // The exhaustion alert fires once, on entry, not per tick.
        assert_eq!(exhausted_alerts, 1);
    }

    #[test]
    fn test_exhausted_service_stays_exhausted() {
        let mut state = ServiceRuntimeState {
            restart_count: 3,
            phase: ServicePhase::Exhausted,
            health: HealthState::Unreachable,
            episode: AlertEpisode::Alerted,
            consecutive_failures: 7,
            last_restart_at: Some(t0() - Duration::seconds(600)),
            ..Default::default()
        };

        let d = evaluate(&mut state, true, &unreachable(), t0(), &config());
        assert_eq!(d.action, PolicyAction::None);
        assert!(d.alerts.is_empty());
        assert_eq!(state.phase, ServicePhase::Exhausted);
        assert_eq!(state.restart_count, 3);
    }

    #[test]
    fn test_single_healthy_probe_does_not_rearm() {
        let mut state = ServiceRuntimeState::default();
        evaluate(&mut state, true, &unreachable(), t0(), &config());
        assert_eq!(state.restart_count, 1);

        let now = t0() + Duration::seconds(90);
        evaluate(&mut state, true, &ProbeOutcome::Healthy, now, &config());
        assert_eq!(state.consecutive_healthy, 1);
        assert_eq!(state.restart_count, 1, "one healthy probe must not reset the budget");
        assert_eq!(state.phase, ServicePhase::Running);
    }

    #[test]
    fn test_three_healthy_probes_rearm_budget() {
        let mut state = ServiceRuntimeState::default();
        evaluate(&mut state, true, &unreachable(), t0(), &config());

        for i in 1..=3 {
            let now = t0() + Duration::seconds(60 + 30 * i);
            evaluate(&mut state, true, &ProbeOutcome::Healthy, now, &config());
        }

        assert_eq!(state.consecutive_healthy, 3);
        assert_eq!(state.restart_count, 0);
        assert_eq!(state.episode, AlertEpisode::NonePending);
    }

    #[test]
    fn test_one_alert_per_failure_episode() {
        let mut state = ServiceRuntimeState::default();

        // Ten failing ticks produce exactly one BECAME_UNREACHABLE.
        let decisions = run_ticks(
            &mut state,
            false,
            unreachable(),
            10,
            t0(),
            Duration::seconds(30),
        );
        let unreachable_alerts: usize = decisions
            .iter()
            .map(|d| {
                d.alerts
                    .iter()
                    .filter(|a| **a == AlertKind::BecameUnreachable)
                    .count()
            })
            .sum();
        assert_eq!(unreachable_alerts, 1);

        // Recovery yields exactly one RECOVERED.
        let d = evaluate(
            &mut state,
            false,
            &ProbeOutcome::Healthy,
            t0() + Duration::seconds(600),
            &config(),
        );
        assert_eq!(d.alerts, vec![AlertKind::Recovered]);

        // A fresh episode re-alerts.
        let d = evaluate(
            &mut state,
            false,
            &unreachable(),
            t0() + Duration::seconds(630),
            &config(),
        );
        assert!(d.alerts.contains(&AlertKind::BecameUnreachable));
    }

    #[test]
    fn test_degraded_counts_as_failure_but_not_unreachable_alert() {
        let mut state = ServiceRuntimeState::default();

        let d = evaluate(&mut state, true, &ProbeOutcome::Degraded(500), t0(), &config());
        assert_eq!(d.action, PolicyAction::Restart);
        assert!(d.alerts.is_empty(), "degraded is not an unreachable episode");
        assert_eq!(state.health, HealthState::Degraded);
    }

    #[test]
    fn test_unreachable_to_degraded_ends_episode() {
        let mut state = ServiceRuntimeState::default();
        evaluate(&mut state, false, &unreachable(), t0(), &config());
        assert_eq!(state.episode, AlertEpisode::Alerted);

        // The endpoint answers again, even if unwell: the unreachable
        // episode is over.
        let d = evaluate(
            &mut state,
            false,
            &ProbeOutcome::Degraded(503),
            t0() + Duration::seconds(30),
            &config(),
        );
        assert!(d.alerts.contains(&AlertKind::Recovered));
        assert_eq!(state.episode, AlertEpisode::NonePending);
    }

    #[test]
    fn test_counters_are_mutually_exclusive() {
        let mut state = ServiceRuntimeState::default();

        evaluate(&mut state, true, &ProbeOutcome::Healthy, t0(), &config());
        assert_eq!((state.consecutive_healthy, state.consecutive_failures), (1, 0));

        evaluate(
            &mut state,
            true,
            &unreachable(),
            t0() + Duration::seconds(30),
            &config(),
        );
        assert_eq!((state.consecutive_healthy, state.consecutive_failures), (0, 1));
    }

    #[test]
    fn test_healthy_streak_does_not_clear_exhaustion() {
        let mut state = ServiceRuntimeState {
            restart_count: 3,
            phase: ServicePhase::Exhausted,
            health: HealthState::Unreachable,
            episode: AlertEpisode::Alerted,
            ..Default::default()
        };

        // A long healthy run must not re-arm an exhausted service.
        for i in 0..5 {
            evaluate(
                &mut state,
                true,
                &ProbeOutcome::Healthy,
                t0() + Duration::seconds(30 * i),
                &config(),
            );
        }

        assert_eq!(state.phase, ServicePhase::Exhausted);
        assert_eq!(state.restart_count, 3);

        // Only the operator path leaves the phase.
        arm_manual_restart(&mut state, t0() + Duration::seconds(300));
        assert_eq!(state.phase, ServicePhase::Restarting);
        assert_eq!(state.restart_count, 1);
    }

    #[test]
    fn test_manual_restart_after_exhaustion() {
        let mut state = ServiceRuntimeState {
            restart_count: 3,
            phase: ServicePhase::Exhausted,
            health: HealthState::Unreachable,
            ..Default::default()
        };

        arm_manual_restart(&mut state, t0());
        assert_eq!(state.restart_count, 1);
        assert_eq!(state.phase, ServicePhase::Restarting);
        assert_eq!(state.last_restart_at, Some(t0()));
    }

    proptest! {
        /// Under any probe sequence with sane spacing, the structural
        /// invariants hold: one counter is always zero, and the restart
        /// count never exceeds the maximum.
        #[test]
        fn prop_policy_invariants(
            outcomes in proptest::collection::vec(0u8..3, 1..200),
            auto_restart in proptest::bool::ANY,
        ) {
            let cfg = config();
            let mut state = ServiceRuntimeState::default();

            for (i, kind) in outcomes.iter().enumerate() {
                let outcome = match *kind {
                    0 => ProbeOutcome::Healthy,
                    1 => ProbeOutcome::Degraded(500),
                    _ => ProbeOutcome::Unreachable("down".into()),
                };
                let now = t0() + Duration::seconds(30 * i as i64);
                let was_exhausted = state.phase == ServicePhase::Exhausted;
                evaluate(&mut state, auto_restart, &outcome, now, &cfg);

                prop_assert!(
                    state.consecutive_healthy == 0 || state.consecutive_failures == 0
                );
                prop_assert!(state.restart_count <= cfg.max_restarts);
                if was_exhausted {
                    prop_assert_eq!(state.phase, ServicePhase::Exhausted);
                }
                if !auto_restart {
                    prop_assert_eq!(state.restart_count, 0);
                }
            }
        }

        /// Restart attempts are never scheduled closer than the cooldown.
        #[test]
        fn prop_cooldown_is_respected(
            gaps in proptest::collection::vec(1i64..150, 1..100),
        ) {
            let cfg = config();
            let mut state = ServiceRuntimeState::default();
            let mut now = t0();
            let mut restart_times = Vec::new();

            for gap in gaps {
                now += Duration::seconds(gap);
                let d = evaluate(&mut state, true, &unreachable(), now, &cfg);
                if d.action == PolicyAction::Restart {
                    restart_times.push(now);
                }
            }

            for pair in restart_times.windows(2) {
                prop_assert!(pair[1] - pair[0] >= cfg.cooldown());
            }
        }
    }
}
