use std::time::{Duration, Instant};

/// Decides when the next frame is due and whether the loop is still live.
///
/// The window loop asks `ready_for_frame` from its idle callback and requests
/// a redraw when the answer is yes; each rendered frame calls `mark_rendered`
/// to push the next deadline out. That makes the loop self-perpetuating: a
/// failure that skips `mark_rendered` (or exits the loop) stops the
/// animation instead of silently spinning.
///
/// `cancel` flips the scheduler dead: no future tick is ever ready again. A
/// tick already being rendered is unaffected; cancellation only gates the
/// next `ready_for_frame` query.
#[derive(Debug)]
pub(crate) struct FrameScheduler {
    target_interval: Option<Duration>,
    next_due: Option<Instant>,
    cancelled: bool,
}

impl FrameScheduler {
    /// `target_fps` of `None` or `<= 0` renders on every refresh callback.
    pub(crate) fn new(target_fps: Option<f32>) -> Self {
        let target_interval = target_fps
            .filter(|fps| *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        Self {
            target_interval,
            next_due: None,
            cancelled: false,
        }
    }

    pub(crate) fn ready_for_frame(&self, now: Instant) -> bool {
        if self.cancelled {
            return false;
        }
        match self.next_due {
            Some(due) => now >= due,
            None => true,
        }
    }

    /// Deadline for the next frame, if one is pending in the future.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        if self.cancelled {
            return None;
        }
        self.next_due
    }

    /// Advances the deadline after a presented frame. The next due time steps
    /// by one interval from the previous deadline to keep a steady cadence,
    /// but never lands in the past, so a long stall yields one catch-up
    /// frame, not a burst.
    pub(crate) fn mark_rendered(&mut self, now: Instant) {
        let Some(interval) = self.target_interval else {
            return;
        };
        let stepped = match self.next_due {
            Some(due) => due + interval,
            None => now + interval,
        };
        self.next_due = Some(if stepped < now { now + interval } else { stepped });
    }

    pub(crate) fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(100);

    #[test]
    fn uncapped_scheduler_is_always_ready() {
        let mut scheduler = FrameScheduler::new(None);
        let now = Instant::now();
        assert!(scheduler.ready_for_frame(now));
        scheduler.mark_rendered(now);
        assert!(scheduler.ready_for_frame(now));
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn zero_fps_is_treated_as_uncapped() {
        let scheduler = FrameScheduler::new(Some(0.0));
        assert!(scheduler.ready_for_frame(Instant::now()));
    }

    #[test]
    fn capped_scheduler_waits_one_interval_between_frames() {
        let mut scheduler = FrameScheduler::new(Some(10.0));
        let start = Instant::now();

        assert!(scheduler.ready_for_frame(start));
        scheduler.mark_rendered(start);

        assert!(!scheduler.ready_for_frame(start + INTERVAL / 2));
        assert_eq!(scheduler.next_deadline(), Some(start + INTERVAL));
        assert!(scheduler.ready_for_frame(start + INTERVAL));
    }

    #[test]
    fn cadence_steps_from_the_deadline_not_the_render_time() {
        let mut scheduler = FrameScheduler::new(Some(10.0));
        let start = Instant::now();
        scheduler.mark_rendered(start);

        // Rendering slightly late must not drift the schedule.
        scheduler.mark_rendered(start + INTERVAL + Duration::from_millis(3));
        assert_eq!(scheduler.next_deadline(), Some(start + INTERVAL * 2));
    }

    #[test]
    fn long_stall_yields_no_burst() {
        let mut scheduler = FrameScheduler::new(Some(10.0));
        let start = Instant::now();
        scheduler.mark_rendered(start);

        let stalled = start + INTERVAL * 7;
        assert!(scheduler.ready_for_frame(stalled));
        scheduler.mark_rendered(stalled);
        assert_eq!(scheduler.next_deadline(), Some(stalled + INTERVAL));
    }

    #[test]
    fn cancel_stops_all_future_ticks() {
        let mut scheduler = FrameScheduler::new(None);
        let start = Instant::now();
        assert!(scheduler.ready_for_frame(start));

        scheduler.cancel();
        assert!(scheduler.is_cancelled());
        // No instant, however far out, sees another tick.
        for tick in 0..10u64 {
            let later = start + INTERVAL * (tick as u32);
            assert!(!scheduler.ready_for_frame(later));
        }
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn cancel_also_silences_a_capped_schedule() {
        let mut scheduler = FrameScheduler::new(Some(60.0));
        let start = Instant::now();
        scheduler.mark_rendered(start);
        scheduler.cancel();
        assert!(!scheduler.ready_for_frame(start + Duration::from_secs(5)));
        assert_eq!(scheduler.next_deadline(), None);
    }
}
