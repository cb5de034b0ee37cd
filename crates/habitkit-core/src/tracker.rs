//! Habit tracker: the single owner and writer of the habit collection.
//!
//! Every mutating command runs `snapshot -> apply -> persist` in one call:
//!
//! ```text
//! commit()   copy the collection into the single undo slot
//! apply      change one habit (copy-on-write) or the list itself
//! persist()  write collection and undo slot together
//! ```
//!
//! The collection is a `Vec<Arc<Habit>>`. A snapshot clones only the pointer
//! vector, and `Arc::make_mut` copies just the habit being edited, so the undo
//! slot shares every untouched habit with the live collection.
//!
//! ## Usage
//!
//! ```ignore
//! let mut tracker = HabitTracker::open(Database::open()?, SystemClock);
//! let id = tracker.add_habit("Read", Some(30), &ScheduleSpec::Daily)?;
//! tracker.toggle_today(id)?;
//! for event in tracker.drain_events() { /* celebrate */ }
//! ```

use std::sync::Arc;

use crate::clock::{clamp_rollover_hour, Clock, DateKey, SystemClock};
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::habit::{parse_goal, Habit, HabitId};
use crate::ordering::{order, FilterMode, SortMode};
use crate::quota::{check_acknowledgements, Acknowledgement};
use crate::recurrence::ScheduleSpec;
use crate::storage::repository::{self, HABITS_KEY, UNDO_KEY};
use crate::storage::{KvStore, Settings};
use crate::view::HabitView;

pub struct HabitTracker<S: KvStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    settings: Settings,
    habits: Vec<Arc<Habit>>,
    undo_slot: Option<Vec<Arc<Habit>>>,
    rendered: Vec<HabitId>,
    events: Vec<Event>,
}

impl<S: KvStore, C: Clock> HabitTracker<S, C> {
    /// Load collection, settings and undo slot from `store`.
    ///
    /// Malformed stored data is recovered to empty/default, never an error.
    pub fn open(store: S, clock: C) -> Self {
        let habits = repository::load_habits(&store)
            .into_iter()
            .map(Arc::new)
            .collect::<Vec<_>>();
        let undo_slot = repository::load_undo(&store)
            .map(|snapshot| snapshot.into_iter().map(Arc::new).collect());
        let settings = Settings::load(&store);
        tracing::debug!(
            habits = habits.len(),
            can_undo = undo_slot.is_some(),
            rollover_hour = settings.rollover_hour,
            "opened habit tracker"
        );

        let mut tracker = Self {
            store,
            clock,
            settings,
            habits,
            undo_slot,
            rendered: Vec::new(),
            events: Vec::new(),
        };
        tracker.rerender();
        tracker
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Today's key under the configured rollover hour.
    pub fn today_key(&self) -> DateKey {
        self.clock.today_key(self.settings.rollover_hour)
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn habits(&self) -> impl Iterator<Item = &Habit> + '_ {
        self.habits.iter().map(|h| h.as_ref())
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn get(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id).map(|h| h.as_ref())
    }

    pub fn can_undo(&self) -> bool {
        self.undo_slot.is_some()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Computed view of one habit, independent of filter and sort.
    pub fn view(&self, id: HabitId) -> Option<HabitView> {
        let today = self.today_key();
        self.get(id).map(|h| HabitView::compute(h, today))
    }

    /// Filtered and sorted views; also becomes the rendered order.
    pub fn views(&mut self) -> Vec<HabitView> {
        self.views_with(self.settings.filter, self.settings.sort)
    }

    /// Like [`views`](Self::views) with one-off modes that are not saved.
    pub fn views_with(&mut self, filter: FilterMode, sort: SortMode) -> Vec<HabitView> {
        let today = self.today_key();
        let views: Vec<HabitView> =
            order(self.habits.iter().map(|h| h.as_ref()), filter, sort, today)
                .into_iter()
                .map(|h| HabitView::compute(h, today))
                .collect();
        self.rendered = views.iter().map(|v| v.id).collect();
        views
    }

    /// Ids in the order last presented, for positional addressing.
    pub fn rendered_order(&self) -> &[HabitId] {
        &self.rendered
    }

    /// Take the events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Add a habit. A blank name is rejected; goal values below 1 mean no goal.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyName`] for a blank name, or a storage
    /// error if persisting fails.
    pub fn add_habit(
        &mut self,
        name: &str,
        goal_days: Option<u32>,
        schedule: &ScheduleSpec,
    ) -> Result<HabitId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        self.commit();
        let habit =
            Habit::new(name, schedule.resolve(), self.clock.now_utc()).with_goal(goal_days);
        let id = habit.id;
        tracing::debug!(%id, name, schedule = %habit.schedule.label(), "adding habit");
        self.habits.push(Arc::new(habit));
        self.persist()?;

        self.emit(|at| Event::HabitAdded {
            id,
            name: name.to_string(),
            at,
        });
        Ok(id)
    }

    /// Flip today's completion for `id`, then fire any acknowledgements.
    ///
    /// Returns the new completion state, or `None` for an unknown id.
    ///
    /// # Errors
    /// Returns an error if persisting fails.
    pub fn toggle_today(&mut self, id: HabitId) -> Result<Option<bool>> {
        let Some(idx) = self.position(id) else {
            return Ok(None);
        };
        let today = self.today_key();

        self.commit();
        let habit = Arc::make_mut(&mut self.habits[idx]);
        let done = habit.toggle_day(today);
        let acknowledgements = check_acknowledgements(habit, today);
        let name = habit.name.clone();
        self.persist()?;

        tracing::debug!(%id, day = %today, done, "toggled completion");
        self.emit(|at| Event::CompletionToggled {
            id,
            day: today,
            done,
            at,
        });
        for ack in acknowledgements {
            tracing::info!(%id, ?ack, "acknowledgement fired");
            let name = name.clone();
            self.emit(|at| match ack {
                Acknowledgement::GoalMet { streak, goal } => Event::GoalReached {
                    id,
                    name,
                    streak,
                    goal,
                    at,
                },
                Acknowledgement::WeeklyTargetMet { count, target } => Event::WeeklyTargetReached {
                    id,
                    name,
                    count,
                    target,
                    week_start: today.week_start(),
                    at,
                },
            });
        }
        Ok(Some(done))
    }

    /// Toggle today for the first habit of the rendered order.
    ///
    /// # Errors
    /// Returns an error if persisting fails.
    pub fn toggle_first_visible(&mut self) -> Result<Option<(HabitId, bool)>> {
        let Some(&id) = self.rendered.first() else {
            return Ok(None);
        };
        Ok(self.toggle_today(id)?.map(|done| (id, done)))
    }

    /// Set the goal from free-form input; invalid or non-positive means no goal.
    ///
    /// Returns the stored goal, or `None` if `id` is unknown.
    ///
    /// # Errors
    /// Returns an error if persisting fails.
    pub fn update_goal(&mut self, id: HabitId, input: &str) -> Result<Option<Option<u32>>> {
        let Some(idx) = self.position(id) else {
            return Ok(None);
        };
        let goal_days = parse_goal(input);

        self.commit();
        Arc::make_mut(&mut self.habits[idx]).goal_days = goal_days;
        self.persist()?;

        tracing::debug!(%id, ?goal_days, "updated goal");
        self.emit(|at| Event::GoalUpdated { id, goal_days, at });
        Ok(Some(goal_days))
    }

    /// Delete a habit after `confirm` approves it. A declined confirmation or
    /// unknown id changes nothing, including the undo slot.
    ///
    /// # Errors
    /// Returns an error if persisting fails.
    pub fn remove_habit<F>(&mut self, id: HabitId, confirm: F) -> Result<bool>
    where
        F: FnOnce(&Habit) -> bool,
    {
        let Some(idx) = self.position(id) else {
            return Ok(false);
        };
        if !confirm(&self.habits[idx]) {
            tracing::debug!(%id, "delete declined");
            return Ok(false);
        }

        self.commit();
        let removed = self.habits.remove(idx);
        self.persist()?;

        tracing::debug!(%id, "removed habit");
        self.emit(|at| Event::HabitRemoved {
            id,
            name: removed.name.clone(),
            at,
        });
        Ok(true)
    }

    /// Flip the persisted collapsed flag. Returns the new value.
    ///
    /// # Errors
    /// Returns an error if persisting fails.
    pub fn toggle_collapsed(&mut self, id: HabitId) -> Result<Option<bool>> {
        let Some(idx) = self.position(id) else {
            return Ok(None);
        };

        self.commit();
        let habit = Arc::make_mut(&mut self.habits[idx]);
        habit.collapsed = !habit.collapsed;
        let collapsed = habit.collapsed;
        self.persist()?;

        self.emit(|at| Event::CollapsedToggled { id, collapsed, at });
        Ok(Some(collapsed))
    }

    /// Restore the collection from the undo slot and clear it.
    /// Returns `false` when there was nothing to undo.
    ///
    /// # Errors
    /// Returns an error if persisting fails.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(snapshot) = self.undo_slot.take() else {
            return Ok(false);
        };
        self.habits = snapshot;
        self.persist()?;

        tracing::info!(habits = self.habits.len(), "restored undo snapshot");
        self.emit(|at| Event::Undone { at });
        Ok(true)
    }

    /// Change the sort mode. Not undoable.
    ///
    /// # Errors
    /// Returns an error if saving settings fails.
    pub fn change_sort(&mut self, sort: SortMode) -> Result<()> {
        self.settings.sort = sort;
        self.settings.save(&self.store)?;
        self.emit(|at| Event::SortChanged { sort, at });
        Ok(())
    }

    /// Change the filter mode. Not undoable.
    ///
    /// # Errors
    /// Returns an error if saving settings fails.
    pub fn change_filter(&mut self, filter: FilterMode) -> Result<()> {
        self.settings.filter = filter;
        self.settings.save(&self.store)?;
        self.emit(|at| Event::FilterChanged { filter, at });
        Ok(())
    }

    /// Change the rollover hour, clamped into `0..=23`. Returns the stored value.
    ///
    /// # Errors
    /// Returns an error if saving settings fails.
    pub fn change_rollover_hour(&mut self, hour: i64) -> Result<u32> {
        let rollover_hour = clamp_rollover_hour(hour);
        self.settings.rollover_hour = rollover_hour;
        self.settings.save(&self.store)?;
        self.emit(|at| Event::RolloverChanged { rollover_hour, at });
        Ok(rollover_hour)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn position(&self, id: HabitId) -> Option<usize> {
        self.habits.iter().position(|h| h.id == id)
    }

    /// Overwrite the undo slot with the current collection.
    fn commit(&mut self) {
        self.undo_slot = Some(self.habits.clone());
    }

    /// Write collection and undo slot in one store update.
    fn persist(&self) -> Result<()> {
        let habits = repository::encode(self.habits.iter().map(|h| h.as_ref()))?;
        let undo = self
            .undo_slot
            .as_ref()
            .map(|snapshot| repository::encode(snapshot.iter().map(|h| h.as_ref())))
            .transpose()?;
        self.store.apply(&[
            (HABITS_KEY, Some(habits.as_str())),
            (UNDO_KEY, undo.as_deref()),
        ])
    }

    /// Recompute the rendered order without building views.
    fn rerender(&mut self) {
        let today = self.today_key();
        self.rendered = order(
            self.habits.iter().map(|h| h.as_ref()),
            self.settings.filter,
            self.settings.sort,
            today,
        )
        .into_iter()
        .map(|h| h.id)
        .collect();
    }

    fn emit(&mut self, build: impl FnOnce(chrono::DateTime<chrono::Utc>) -> Event) {
        let event = build(self.clock.now_utc());
        self.events.push(event);
        self.rerender();
    }
}
