use crate::time::TimeSource;

use super::{ProfilerError, QueryBackend};

/// Wall-clock interval between two published averages, in seconds.
pub const PUBLISH_INTERVAL_SECS: f64 = 0.5;

const SLOT_COUNT: usize = 2;

/// Double-buffered elapsed-time profiler.
///
/// Frame protocol, in order, once per frame:
/// 1. `begin` before the GPU work to time,
/// 2. `end` after it,
/// 3. `end_frame` (or `wait_for_data_and_update`) after the frame is submitted.
///
/// Queries alternate between two slots. `end_frame` on frame `k` reads the
/// query recorded on frame `k - 1`, which has had a whole frame to complete.
/// The very first `end_frame` only arms the read slot.
///
/// Samples are averaged and published every `PUBLISH_INTERVAL_SECS`;
/// `average_time` reports 0.0 until the first publish.
pub struct GpuProfiler<B, C>
where
    B: QueryBackend,
    C: TimeSource,
{
    backend: B,
    clock: C,

    queries: [Option<B::Query>; SLOT_COUNT],
    write_slot: usize,
    /// `None` until the first `end_frame` (no completed query yet).
    read_slot: Option<usize>,

    average_time: f64,
    accumulated_time: f64,
    sample_count: u32,
    window_start_time: f64,
    publish_interval: f64,
}

impl<B, C> GpuProfiler<B, C>
where
    B: QueryBackend,
    C: TimeSource,
{
    /// Allocates both queries from `backend`.
    ///
    /// If the second allocation fails the first query is released before the
    /// error is returned.
    pub fn new(mut backend: B, clock: C) -> Result<Self, ProfilerError> {
        let first = backend.create_query()?;
        let second = match backend.create_query() {
            Ok(q) => q,
            Err(e) => {
                backend.destroy_query(first);
                return Err(e);
            }
        };

        log::debug!("gpu profiler created with {SLOT_COUNT} query slots");

        Ok(Self {
            backend,
            clock,
            queries: [Some(first), Some(second)],
            write_slot: 0,
            read_slot: None,
            average_time: 0.0,
            accumulated_time: 0.0,
            sample_count: 0,
            window_start_time: 0.0,
            publish_interval: PUBLISH_INTERVAL_SECS,
        })
    }

    /// Overrides the publish interval. Non-positive or non-finite values are ignored.
    pub fn with_publish_interval(mut self, secs: f64) -> Self {
        if secs.is_finite() && secs > 0.0 {
            self.publish_interval = secs;
        } else {
            log::warn!("ignoring invalid profiler publish interval {secs}");
        }
        self
    }

    /// Starts timing into the current write slot.
    pub fn begin(&mut self, encoder: &mut B::Encoder) {
        if let Some(query) = self.queries[self.write_slot].as_ref() {
            self.backend.begin_query(encoder, query);
        }
    }

    /// Stops the query started by `begin`.
    pub fn end(&mut self, encoder: &mut B::Encoder) {
        if let Some(query) = self.queries[self.write_slot].as_ref() {
            self.backend.end_query(encoder, query);
        }
    }

    /// Advances the ring and folds the previous frame's result into the average.
    ///
    /// Never blocks in the steady state.
    pub fn end_frame(&mut self) {
        self.advance(false);
    }

    /// Same transitions as `end_frame`, but waits for the result to be available.
    pub fn wait_for_data_and_update(&mut self) {
        self.advance(true);
    }

    /// Last published average GPU time, in seconds.
    pub fn average_time(&self) -> f64 {
        self.average_time
    }

    /// Slot the next `begin` records into.
    pub fn write_slot(&self) -> usize {
        self.write_slot
    }

    /// Slot the next `end_frame` reads from; `None` before warm-up.
    pub fn read_slot(&self) -> Option<usize> {
        self.read_slot
    }

    /// Samples accumulated since the last publish.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Sum of samples accumulated since the last publish, in seconds.
    pub fn accumulated_time(&self) -> f64 {
        self.accumulated_time
    }

    fn advance(&mut self, wait: bool) {
        if let Some(query) = self.queries[self.write_slot].as_ref() {
            self.backend.query_submitted(query);
        }
        self.write_slot = (self.write_slot + 1) % SLOT_COUNT;

        let Some(read_slot) = self.read_slot else {
            self.read_slot = Some(0);
            return;
        };

        let result = match self.queries[read_slot].as_ref() {
            Some(query) if wait => self.backend.wait_result_ns(query),
            Some(query) => self.backend.try_result_ns(query),
            None => Err(ProfilerError::QueryNotReady),
        };
        self.read_slot = Some((read_slot + 1) % SLOT_COUNT);

        match result {
            Ok(ns) => {
                self.accumulated_time += ns as f64 * 1e-9;
                self.sample_count += 1;
            }
            Err(e) => log::warn!("gpu profiler: slot {read_slot}: {e}; sample dropped"),
        }

        let now = self.clock.now_secs();
        if now > self.window_start_time + self.publish_interval {
            if self.sample_count > 0 {
                self.average_time = self.accumulated_time / self.sample_count as f64;
                log::trace!("gpu profiler published {:.6}s", self.average_time);
            }
            self.accumulated_time = 0.0;
            self.sample_count = 0;
            self.window_start_time = now;
        }
    }
}

impl<B, C> Drop for GpuProfiler<B, C>
where
    B: QueryBackend,
    C: TimeSource,
{
    fn drop(&mut self) {
        for slot in self.queries.iter_mut() {
            if let Some(query) = slot.take() {
                self.backend.destroy_query(query);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;

    // ── test doubles ──────────────────────────────────────────────────────

    #[derive(Default)]
    struct MockLog {
        next_id: u32,
        created: Vec<u32>,
        destroyed: Vec<u32>,
        begins: Vec<u32>,
        ends: Vec<u32>,
        submitted: Vec<u32>,
        reads: Vec<u32>,
        waits: Vec<u32>,
        fail_after: Option<usize>,
        /// Duration scripted for the next `begin`.
        next_duration_ns: u64,
        recorded: HashMap<u32, u64>,
        missing: bool,
    }

    struct MockBackend(Rc<RefCell<MockLog>>);

    impl QueryBackend for MockBackend {
        type Query = u32;
        type Encoder = ();

        fn create_query(&mut self) -> Result<u32, ProfilerError> {
            let mut log = self.0.borrow_mut();
            let limit = log.fail_after;
            if limit.is_some_and(|n| log.created.len() >= n) {
                return Err(ProfilerError::ResourceCreationFailed("mock".into()));
            }
            let id = log.next_id;
            log.next_id += 1;
            log.created.push(id);
            Ok(id)
        }

        fn destroy_query(&mut self, query: u32) {
            self.0.borrow_mut().destroyed.push(query);
        }

        fn begin_query(&mut self, _: &mut (), query: &u32) {
            let mut log = self.0.borrow_mut();
            let d = log.next_duration_ns;
            log.recorded.insert(*query, d);
            log.begins.push(*query);
        }

        fn end_query(&mut self, _: &mut (), query: &u32) {
            self.0.borrow_mut().ends.push(*query);
        }

        fn query_submitted(&mut self, query: &u32) {
            self.0.borrow_mut().submitted.push(*query);
        }

        fn try_result_ns(&mut self, query: &u32) -> Result<u64, ProfilerError> {
            let mut log = self.0.borrow_mut();
            log.reads.push(*query);
            if log.missing {
                return Err(ProfilerError::QueryNotReady);
            }
            log.recorded.get(query).copied().ok_or(ProfilerError::QueryNotReady)
        }

        fn wait_result_ns(&mut self, query: &u32) -> Result<u64, ProfilerError> {
            let mut log = self.0.borrow_mut();
            log.waits.push(*query);
            log.recorded.get(query).copied().ok_or(ProfilerError::QueryNotReady)
        }
    }

    #[derive(Clone, Default)]
    struct FakeClock(Rc<Cell<f64>>);

    impl FakeClock {
        fn set(&self, secs: f64) {
            self.0.set(secs);
        }
    }

    impl TimeSource for FakeClock {
        fn now_secs(&self) -> f64 {
            self.0.get()
        }
    }

    fn profiler() -> (GpuProfiler<MockBackend, FakeClock>, Rc<RefCell<MockLog>>, FakeClock) {
        let log = Rc::new(RefCell::new(MockLog::default()));
        let clock = FakeClock::default();
        let p = GpuProfiler::new(MockBackend(log.clone()), clock.clone()).unwrap();
        (p, log, clock)
    }

    /// Runs one frame whose bracketed work "takes" `duration_ns`.
    fn frame(p: &mut GpuProfiler<MockBackend, FakeClock>, log: &Rc<RefCell<MockLog>>, duration_ns: u64) {
        log.borrow_mut().next_duration_ns = duration_ns;
        p.begin(&mut ());
        p.end(&mut ());
        p.end_frame();
    }

    const MS: u64 = 1_000_000;

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn new_starts_in_warm_up_state() {
        let (p, log, _) = profiler();
        assert_eq!(p.write_slot(), 0);
        assert_eq!(p.read_slot(), None);
        assert_eq!(p.sample_count(), 0);
        assert_eq!(p.average_time(), 0.0);
        assert_eq!(log.borrow().created.len(), 2);
    }

    #[test]
    fn drop_releases_exactly_the_two_queries() {
        let (p, log, _) = profiler();
        drop(p);
        let log = log.borrow();
        let mut destroyed = log.destroyed.clone();
        destroyed.sort_unstable();
        assert_eq!(destroyed, log.created);
        assert_eq!(destroyed.len(), 2);
    }

    #[test]
    fn failed_second_allocation_releases_the_first() {
        let log = Rc::new(RefCell::new(MockLog { fail_after: Some(1), ..Default::default() }));
        let result = GpuProfiler::new(MockBackend(log.clone()), FakeClock::default());
        assert!(matches!(result, Err(ProfilerError::ResourceCreationFailed(_))));
        let log = log.borrow();
        assert_eq!(log.created, vec![0]);
        assert_eq!(log.destroyed, vec![0]);
    }

    // ── frame protocol ────────────────────────────────────────────────────

    #[test]
    fn first_end_frame_does_not_read() {
        let (mut p, log, _) = profiler();
        frame(&mut p, &log, 3 * MS);
        assert!(log.borrow().reads.is_empty());
        assert_eq!(p.read_slot(), Some(0));
        assert_eq!(p.write_slot(), 1);
        assert_eq!(p.sample_count(), 0);
    }

    #[test]
    fn begin_and_end_target_the_write_slot() {
        let (mut p, log, _) = profiler();
        for _ in 0..4 {
            frame(&mut p, &log, MS);
        }
        let log = log.borrow();
        assert_eq!(log.begins, vec![0, 1, 0, 1]);
        assert_eq!(log.ends, vec![0, 1, 0, 1]);
        assert_eq!(log.submitted, vec![0, 1, 0, 1]);
    }

    #[test]
    fn reads_the_previous_frames_query() {
        let (mut p, log, _) = profiler();
        let durations = [1 * MS, 2 * MS, 3 * MS, 4 * MS, 5 * MS];

        for (i, &d) in durations.iter().enumerate() {
            let before = p.accumulated_time();
            frame(&mut p, &log, d);
            if i == 0 {
                continue;
            }
            // Frame i consumes frame i-1's duration, not the one it just ended.
            let sample = p.accumulated_time() - before;
            let expected = durations[i - 1] as f64 * 1e-9;
            assert!((sample - expected).abs() < 1e-12, "frame {i}: {sample} vs {expected}");
        }

        // Every recorded frame except the last has been read.
        assert_eq!(p.sample_count(), 4);
        assert_eq!(log.borrow().reads, vec![0, 1, 0, 1]);
    }

    #[test]
    fn slots_alternate_with_read_one_step_behind() {
        let (mut p, log, _) = profiler();
        let mut writes = vec![p.write_slot()];
        let mut reads = Vec::new();

        for _ in 0..6 {
            // At entry to end_frame the read slot trails the write slot by one.
            if let Some(r) = p.read_slot() {
                assert_eq!(r, (p.write_slot() + 1) % 2);
            }
            frame(&mut p, &log, MS);
            writes.push(p.write_slot());
            reads.push(p.read_slot().unwrap());
        }

        assert_eq!(writes, vec![0, 1, 0, 1, 0, 1, 0]);
        assert_eq!(reads, vec![0, 1, 0, 1, 0, 1]);
    }

    // ── publish cadence ───────────────────────────────────────────────────

    #[test]
    fn average_holds_until_window_elapses() {
        let (mut p, log, clock) = profiler();
        clock.set(0.1);
        for _ in 0..20 {
            frame(&mut p, &log, 2 * MS);
        }
        assert_eq!(p.average_time(), 0.0);
        assert_eq!(p.sample_count(), 19);

        clock.set(0.5);
        frame(&mut p, &log, 2 * MS);
        assert_eq!(p.average_time(), 0.0, "boundary itself does not publish");
    }

    #[test]
    fn crossing_window_publishes_mean_and_resets() {
        let (mut p, log, clock) = profiler();
        clock.set(0.1);
        frame(&mut p, &log, 1 * MS); // warm-up
        frame(&mut p, &log, 3 * MS); // reads 1 ms
        frame(&mut p, &log, 5 * MS); // reads 3 ms

        clock.set(0.6);
        frame(&mut p, &log, 7 * MS); // reads 5 ms, publishes

        let expected = (1.0 + 3.0 + 5.0) / 3.0 * 1e-3;
        assert!((p.average_time() - expected).abs() < 1e-12);
        assert_eq!(p.sample_count(), 0);
        assert_eq!(p.accumulated_time(), 0.0);

        // The new window starts at 0.6; nothing publishes until after 1.1.
        clock.set(1.0);
        frame(&mut p, &log, 7 * MS);
        assert!((p.average_time() - expected).abs() < 1e-12);
        assert_eq!(p.sample_count(), 1);

        clock.set(1.2);
        frame(&mut p, &log, 7 * MS);
        assert!((p.average_time() - 7e-3).abs() < 1e-12);
    }

    #[test]
    fn average_time_reads_are_idempotent() {
        let (mut p, log, clock) = profiler();
        frame(&mut p, &log, 4 * MS);
        clock.set(1.0);
        frame(&mut p, &log, 4 * MS);

        let a = p.average_time();
        let b = p.average_time();
        let c = p.average_time();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(log.borrow().reads.len(), 1);
    }

    #[test]
    fn custom_publish_interval() {
        let (p, log, clock) = profiler();
        let mut p = p.with_publish_interval(2.0);
        frame(&mut p, &log, MS);
        clock.set(1.5);
        frame(&mut p, &log, MS);
        assert_eq!(p.average_time(), 0.0);
        clock.set(2.5);
        frame(&mut p, &log, MS);
        assert!((p.average_time() - 1e-3).abs() < 1e-12);
    }

    #[test]
    fn invalid_publish_interval_is_ignored() {
        let (p, log, clock) = profiler();
        let mut p = p.with_publish_interval(-1.0);
        frame(&mut p, &log, MS);
        clock.set(0.6);
        frame(&mut p, &log, MS);
        assert!((p.average_time() - 1e-3).abs() < 1e-12);
    }

    // ── degraded reads ────────────────────────────────────────────────────

    #[test]
    fn missing_result_is_excluded_but_slots_advance() {
        let (mut p, log, _) = profiler();
        frame(&mut p, &log, MS);
        log.borrow_mut().missing = true;
        frame(&mut p, &log, MS);
        assert_eq!(p.sample_count(), 0);
        assert_eq!(p.read_slot(), Some(1));
        assert_eq!(p.write_slot(), 0);
    }

    #[test]
    fn missing_results_do_not_publish_a_nan() {
        let (mut p, log, clock) = profiler();
        log.borrow_mut().missing = true;
        frame(&mut p, &log, MS);
        clock.set(1.0);
        frame(&mut p, &log, MS);
        assert_eq!(p.average_time(), 0.0);
    }

    #[test]
    fn wait_variant_uses_blocking_read() {
        let (mut p, log, _) = profiler();
        log.borrow_mut().next_duration_ns = 2 * MS;
        p.begin(&mut ());
        p.end(&mut ());
        p.wait_for_data_and_update();
        p.begin(&mut ());
        p.end(&mut ());
        p.wait_for_data_and_update();

        let log = log.borrow();
        assert!(log.reads.is_empty());
        assert_eq!(log.waits, vec![0]);
        assert_eq!(p.sample_count(), 1);
    }
}
