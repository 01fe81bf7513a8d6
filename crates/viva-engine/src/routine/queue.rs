use crate::resources::{Registry, RoutineId};
use crate::time::Timer;

/// What a routine wants after running.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RoutineControl {
    Continue,
    Finish,
}

pub type RoutineFn = Box<dyn FnMut(&mut Registry, &Timer) -> RoutineControl>;

/// A deferred or repeating callback.
///
/// All times are game-time seconds. A routine runs on a frame where
/// `age > timeout`, `since_last_run > interval` and (for a non-zero `duration`)
/// `age < duration`.
pub struct Routine {
    id: RoutineId,
    timeout: f32,
    interval: f32,
    /// 0 runs forever.
    duration: f32,
    once: bool,
    started: f32,
    last: f32,
    f: RoutineFn,
}

impl Routine {
    pub(crate) fn new(
        id: RoutineId,
        timer: &Timer,
        timeout: f32,
        interval: f32,
        duration: f32,
        once: bool,
        f: RoutineFn,
    ) -> Self {
        let now = timer.game_time();
        Self {
            id,
            timeout,
            interval,
            duration,
            once,
            started: now,
            last: now,
            f,
        }
    }

    #[inline]
    pub fn id(&self) -> RoutineId {
        self.id
    }

    fn expired(&self, now: f32) -> bool {
        self.duration > 0.0 && now - self.started >= self.duration
    }

    fn due(&self, now: f32) -> bool {
        now - self.started > self.timeout && now - self.last > self.interval
    }
}

impl std::fmt::Debug for Routine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Routine")
            .field("id", &self.id)
            .field("timeout", &self.timeout)
            .field("interval", &self.interval)
            .field("duration", &self.duration)
            .field("once", &self.once)
            .finish_non_exhaustive()
    }
}

/// Pending routines, run newest first once per frame.
#[derive(Debug, Default)]
pub struct RoutineQueue {
    routines: Vec<Routine>,
}

impl RoutineQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.routines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }

    pub fn contains(&self, id: RoutineId) -> bool {
        self.routines.iter().any(|r| r.id == id)
    }

    pub(crate) fn push(&mut self, routine: Routine) {
        self.routines.push(routine);
    }

    /// Appends routines queued while this queue was detached.
    pub(crate) fn absorb(&mut self, newer: RoutineQueue) {
        self.routines.extend(newer.routines);
    }

    pub(crate) fn remove(&mut self, id: RoutineId) -> bool {
        let before = self.routines.len();
        self.routines.retain(|r| r.id != id);
        self.routines.len() != before
    }

    /// Runs every due routine and drops the ones that finished or expired.
    ///
    /// Returns the ids of the dropped routines.
    pub(crate) fn run(&mut self, registry: &mut Registry, timer: &Timer) -> Vec<RoutineId> {
        let now = timer.game_time();
        let mut finished = Vec::new();

        let mut i = self.routines.len();
        while i > 0 {
            i -= 1;
            let routine = &mut self.routines[i];

            if registry.take_cancel(routine.id) || routine.expired(now) {
                finished.push(routine.id);
                self.routines.remove(i);
                continue;
            }
            if !routine.due(now) {
                continue;
            }

            routine.last = now;
            let control = (routine.f)(registry, timer);
            let cancelled = registry.take_cancel(routine.id);
            if control == RoutineControl::Finish || routine.once || cancelled {
                finished.push(routine.id);
                self.routines.remove(i);
            }
        }
        finished
    }

    /// Drops everything; returns the dropped ids.
    pub(crate) fn clear(&mut self) -> Vec<RoutineId> {
        self.routines.drain(..).map(|r| r.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    type Runs = Rc<RefCell<Vec<f32>>>;

    fn counter() -> (Runs, impl FnMut(&mut Registry, &Timer) -> RoutineControl + 'static) {
        let runs = Rc::new(RefCell::new(Vec::new()));
        let sink = runs.clone();
        let f = move |_: &mut Registry, t: &Timer| {
            sink.borrow_mut().push(t.game_time());
            RoutineControl::Continue
        };
        (runs, f)
    }

    fn run_at(registry: &mut Registry, timer: &mut Timer, times: &[f32]) {
        for t in times {
            timer.advance_to(*t);
            registry.update_routines(timer);
        }
    }

    #[test]
    fn timeout_fires_once() {
        let mut reg = Registry::new();
        let mut timer = Timer::new();
        let (runs, f) = counter();
        let id = reg.set_timeout(&timer, 0.5, f);

        run_at(&mut reg, &mut timer, &[0.4, 0.6, 0.8, 1.5]);
        assert_eq!(runs.borrow().len(), 1);
        assert!(!reg.routines().contains(id));
        assert!(reg.report_leaks().is_empty());
    }

    #[test]
    fn interval_respects_period() {
        let mut reg = Registry::new();
        let mut timer = Timer::new();
        let (runs, f) = counter();
        reg.set_interval(&timer, 0.5, f);

        run_at(&mut reg, &mut timer, &[0.3, 0.6, 0.9, 1.2, 1.5]);
        assert_eq!(runs.borrow().len(), 2);
        assert_eq!(reg.routines().len(), 1);
    }

    #[test]
    fn duration_expires() {
        let mut reg = Registry::new();
        let mut timer = Timer::new();
        let (runs, f) = counter();
        reg.set_duration(&timer, 0.0, 0.0, 1.0, f);

        run_at(&mut reg, &mut timer, &[0.5, 0.9, 1.0, 1.5]);
        assert_eq!(runs.borrow().len(), 2);
        assert!(reg.routines().is_empty());
    }

    #[test]
    fn zero_duration_runs_forever() {
        let mut reg = Registry::new();
        let mut timer = Timer::new();
        let (runs, f) = counter();
        reg.set_duration(&timer, 0.0, 0.0, 0.0, f);

        run_at(&mut reg, &mut timer, &[1.0, 100.0, 1000.0]);
        assert_eq!(runs.borrow().len(), 3);
    }

    #[test]
    fn finish_removes_and_newest_runs_first() {
        let mut reg = Registry::new();
        let mut timer = Timer::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in ["old", "new"] {
            let sink = order.clone();
            reg.set_interval(&timer, 0.0, move |_, _| {
                sink.borrow_mut().push(tag);
                RoutineControl::Finish
            });
        }

        run_at(&mut reg, &mut timer, &[0.1, 0.2]);
        assert_eq!(*order.borrow(), vec!["new", "old"]);
        assert!(reg.routines().is_empty());
    }

    #[test]
    fn routine_can_cancel_an_older_routine() {
        let mut reg = Registry::new();
        let mut timer = Timer::new();
        let (runs, f) = counter();
        let victim = reg.set_interval(&timer, 0.0, f);

        let cancelled = Rc::new(RefCell::new(None));
        let sink = cancelled.clone();
        reg.set_timeout(&timer, 0.0, move |reg, _| {
            *sink.borrow_mut() = Some(reg.cancel_routine(victim));
            RoutineControl::Finish
        });

        run_at(&mut reg, &mut timer, &[0.1, 0.2, 0.3]);
        assert_eq!(*cancelled.borrow(), Some(true));
        assert!(!reg.routines().contains(victim));
        assert!(runs.borrow().is_empty());
        assert!(reg.report_leaks().is_empty());
    }

    #[test]
    fn cancels_apply_in_either_queue_order() {
        let mut reg = Registry::new();
        let mut timer = Timer::new();
        let (runs, f) = counter();
        let victim_id = Rc::new(RefCell::new(None));
        let slot = victim_id.clone();

        let canceller = reg.set_interval(&timer, 0.0, move |reg, _| {
            let victim = slot.borrow_mut().take();
            if let Some(v) = victim {
                assert!(reg.cancel_routine(v));
            }
            RoutineControl::Continue
        });
        let victim = reg.set_interval(&timer, 0.0, f);
        *victim_id.borrow_mut() = Some(victim);

        // The newer victim runs first, then gets cancelled by the older routine.
        run_at(&mut reg, &mut timer, &[0.1, 0.2]);
        assert_eq!(runs.borrow().len(), 1);
        assert!(!reg.routines().contains(victim));

        reg.set_timeout(&timer, 0.0, move |reg, _| {
            assert!(reg.cancel_routine(canceller));
            assert!(!reg.cancel_routine(canceller));
            RoutineControl::Continue
        });
        run_at(&mut reg, &mut timer, &[0.3]);
        assert!(reg.routines().is_empty());
        assert!(reg.report_leaks().is_empty());
    }

    #[test]
    fn cancel_outside_a_run() {
        let mut reg = Registry::new();
        let timer = Timer::new();
        let (_, f) = counter();
        let id = reg.set_interval(&timer, 0.0, f);
        assert!(reg.cancel_routine(id));
        assert!(!reg.cancel_routine(id));
        assert!(reg.report_leaks().is_empty());
    }

    #[test]
    fn routines_can_queue_routines() {
        let mut reg = Registry::new();
        let mut timer = Timer::new();
        let (runs, f) = counter();
        let mut f = Some(f);

        reg.set_timeout(&timer, 0.0, move |reg, timer| {
            if let Some(f) = f.take() {
                reg.set_timeout(timer, 0.0, f);
            }
            RoutineControl::Finish
        });

        run_at(&mut reg, &mut timer, &[0.1, 0.2]);
        assert_eq!(runs.borrow().len(), 1);
        assert!(reg.routines().is_empty());
    }
}
