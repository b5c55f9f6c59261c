use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::{Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use fitstreak_core::gamification::{BadgeCatalog, Feedback, QuickReaction};
use fitstreak_core::plan::{ResolvedPlan, WorkoutPlan};
use fitstreak_core::session::{
    AbortedSession, ActiveSessions, ActualPerformance, SessionController, SessionState, TimerMode,
};
use fitstreak_core::{Clock, EngineConfig, Event, LogNotifier, SystemClock};

use super::{aborted_key, load_progress, plan_key, print_json, progress_key, session_key, REGISTRY_KEY};
use crate::store::Store;

#[derive(Clone, Copy, ValueEnum)]
pub enum Reaction {
    TooEasy,
    TooHard,
    LovedIt,
    HatedIt,
}

impl From<Reaction> for QuickReaction {
    fn from(reaction: Reaction) -> Self {
        match reaction {
            Reaction::TooEasy => QuickReaction::TooEasy,
            Reaction::TooHard => QuickReaction::TooHard,
            Reaction::LovedIt => QuickReaction::LovedIt,
            Reaction::HatedIt => QuickReaction::HatedIt,
        }
    }
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a session with the pending plan
    Start,
    /// Record the current set
    Log {
        #[arg(long)]
        reps: Option<u32>,
        /// Load in kilograms
        #[arg(long)]
        weight: Option<f64>,
        /// Mark the set as not completed
        #[arg(long)]
        skipped: bool,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Advance the rest timer by a number of milliseconds
    Tick {
        #[arg(long)]
        ms: u64,
    },
    /// End the current rest early
    SkipRest,
    /// Go back to the previous exercise in this phase
    Back,
    /// Print the session state, catching the rest timer up to now
    Status,
    /// Stop the session without rewards
    Abort {
        /// Keep the partial performance log
        #[arg(long)]
        keep_log: bool,
    },
    /// Submit feedback and apply streak, XP and badges
    Finish {
        /// 1 (very easy) to 5 (very hard)
        #[arg(long)]
        difficulty: u8,
        /// 1 to 5
        #[arg(long)]
        enjoyment: u8,
        /// 1 to 5
        #[arg(long)]
        energy: u8,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, value_enum)]
        reaction: Option<Reaction>,
        /// Calendar day to credit (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

/// A session as kept between CLI invocations.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    plan: WorkoutPlan,
    state: SessionState,
    /// When the last command touched this session; `status` ticks from here.
    last_seen_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct StepOutput<'a> {
    events: &'a [Event],
    snapshot: Event,
}

fn load_session(store: &Store, user: &str) -> Result<StoredSession, Box<dyn std::error::Error>> {
    Ok(store
        .load(&session_key(user))?
        .ok_or("no active session; run `fitstreak session start` first")?)
}

fn load_registry(store: &Store) -> Result<ActiveSessions, Box<dyn std::error::Error>> {
    Ok(store.load(REGISTRY_KEY)?.unwrap_or_default())
}

/// Resume the stored session, apply `step`, print and save the result.
///
/// `step` receives the milliseconds since the session was last touched.
fn with_session<F>(
    store: &Store,
    user: &str,
    clock: Arc<dyn Clock>,
    step: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&mut SessionController<'_>, u64) -> fitstreak_core::Result<Vec<Event>>,
{
    let StoredSession {
        plan,
        state,
        last_seen_at,
    } = load_session(store, user)?;
    let now = clock.now();
    let idle_ms = u64::try_from((now - last_seen_at).num_milliseconds()).unwrap_or(0);

    let mut session = SessionController::resume(&plan, state, clock);
    let events = step(&mut session, idle_ms)?;
    print_json(&StepOutput {
        events: &events,
        snapshot: session.snapshot(),
    })?;

    let state = session.into_state();
    store.save(
        &session_key(user),
        &StoredSession {
            plan,
            state,
            last_seen_at: now,
        },
    )?;
    Ok(())
}

pub fn run(action: SessionAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    match action {
        SessionAction::Start => {
            let resolved: ResolvedPlan = store
                .load(&plan_key(user))?
                .ok_or("no pending plan; run `fitstreak plan resolve` first")?;
            let mut registry = load_registry(&store)?;
            let (session, events) = registry.start(user, &resolved.plan, clock.clone())?;
            print_json(&StepOutput {
                events: &events,
                snapshot: session.snapshot(),
            })?;

            let state = session.into_state();
            store.save(REGISTRY_KEY, &registry)?;
            store.save(
                &session_key(user),
                &StoredSession {
                    plan: resolved.plan,
                    state,
                    last_seen_at: clock.now(),
                },
            )?;
        }
        SessionAction::Log {
            reps,
            weight,
            skipped,
            notes,
        } => {
            let actual = ActualPerformance {
                weight,
                reps,
                completed: !skipped,
                notes,
            };
            with_session(&store, user, clock, |s, _| s.record_set(actual))?;
        }
        SessionAction::Tick { ms } => {
            with_session(&store, user, clock, |s, _| s.tick(ms))?;
        }
        SessionAction::SkipRest => {
            with_session(&store, user, clock, |s, _| s.skip_rest())?;
        }
        SessionAction::Back => {
            with_session(&store, user, clock, |s, _| s.go_back())?;
        }
        SessionAction::Status => {
            with_session(&store, user, clock, |s, idle_ms| {
                if s.state().timer_mode == TimerMode::Resting && idle_ms > 0 {
                    s.tick(idle_ms)
                } else {
                    Ok(Vec::new())
                }
            })?;
        }
        SessionAction::Abort { keep_log } => {
            let StoredSession { plan, state, .. } = load_session(&store, user)?;
            let mut session = SessionController::resume(&plan, state, clock);
            let aborted = session.abort()?;

            let mut registry = load_registry(&store)?;
            registry.release(user, aborted.session_id);
            store.save(REGISTRY_KEY, &registry)?;
            store.kv_delete(&session_key(user))?;

            if keep_log {
                let mut kept: Vec<AbortedSession> =
                    store.load(&aborted_key(user))?.unwrap_or_default();
                kept.push(aborted.clone());
                store.save(&aborted_key(user), &kept)?;
            }
            print_json(&aborted)?;
        }
        SessionAction::Finish {
            difficulty,
            enjoyment,
            energy,
            notes,
            reaction,
            date,
        } => {
            let mut feedback = Feedback::new(difficulty, enjoyment, energy);
            if let Some(notes) = notes {
                feedback = feedback.with_notes(notes);
            }
            if let Some(reaction) = reaction {
                feedback = feedback.with_reaction(reaction.into());
            }
            let today = date.unwrap_or_else(|| Local::now().date_naive());

            let StoredSession { plan, state, .. } = load_session(&store, user)?;
            let mut session = SessionController::resume(&plan, state, clock.clone());
            let mut progress = load_progress(&store, user)?;
            let config = EngineConfig::load_or_default();

            let payload = session.finish(
                &feedback,
                &mut progress,
                today,
                &config,
                &BadgeCatalog::default(),
            )?;
            store.save(&progress_key(user), &progress)?;

            let mut registry = load_registry(&store)?;
            registry.release(user, session.session_id());
            store.save(REGISTRY_KEY, &registry)?;

            // Kept so a retried finish returns the recorded result.
            let state = session.into_state();
            store.save(
                &session_key(user),
                &StoredSession {
                    plan,
                    state,
                    last_seen_at: clock.now(),
                },
            )?;

            payload.deliver(&LogNotifier);
            print_json(&payload)?;
        }
    }
    Ok(())
}
