//! Controller owning one relayed stream.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::outcomes::{RelayStatus, StartOutcome, StopOutcome, TickOutcome};
use crate::config::RelayConfig;
use crate::discovery::{DiscoveryEngine, HttpSegmentProbe, ProbeThrottle, SegmentProbe};
use crate::playlist::{PlaylistState, render_master, render_media};
use crate::segment::{Segment, SegmentId, SegmentUrlTemplate};
use crate::{RelayError, Result};

/// Handle to a relayed stream.
///
/// Cloning is cheap and every clone controls the same stream. Playlist
/// state is only mutated by `set_current_id` and by successful ticks; each
/// mutation happens under one write lock, so readers never see a window
/// larger than its capacity or a sequence out of step with the window.
pub struct RelayController<P: SegmentProbe = HttpSegmentProbe> {
    inner: Arc<RelayInner<P>>,
}

struct RelayInner<P: SegmentProbe> {
    config: RelayConfig,
    engine: DiscoveryEngine<P>,
    state: RwLock<PlaylistState>,
    /// Held for the whole duration of a tick; doubles as the in-flight guard
    throttle: tokio::sync::Mutex<ProbeThrottle>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl<P: SegmentProbe> Clone for RelayController<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: SegmentProbe> Drop for RelayInner<P> {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.get_mut().take() {
            handle.abort();
        }
    }
}

impl RelayController<HttpSegmentProbe> {
    /// Creates a relay probing the configured origin over HTTP.
    ///
    /// # Errors
    /// - `RelayError::Configuration` - The configuration is invalid
    /// - `RelayError::HttpClient` - The HTTP client could not be built
    pub fn from_config(config: RelayConfig) -> Result<Self> {
        let probe = HttpSegmentProbe::new(&config)?;
        Self::new(config, probe)
    }
}

impl<P: SegmentProbe + 'static> RelayController<P> {
    /// Creates a relay using the given probe.
    ///
    /// # Errors
    /// - `RelayError::Configuration` - The configuration is invalid
    pub fn new(config: RelayConfig, probe: P) -> Result<Self> {
        config.validate()?;

        let template = SegmentUrlTemplate::from_origin(&config.origin);
        let engine = DiscoveryEngine::new(probe, template, &config.discovery);
        let state = PlaylistState::new(config.playlist.window_capacity);
        let throttle = ProbeThrottle::new(config.discovery.min_probe_interval);

        Ok(Self {
            inner: Arc::new(RelayInner {
                config,
                engine,
                state: RwLock::new(state),
                throttle: tokio::sync::Mutex::new(throttle),
                ticker: Mutex::new(None),
            }),
        })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.inner.config
    }

    pub fn engine(&self) -> &DiscoveryEngine<P> {
        &self.inner.engine
    }

    /// Reseeds the stream at `id`, clearing the window and media sequence.
    pub fn set_current_id(&self, id: SegmentId) {
        self.inner.state.write().reset(id);
        tracing::info!(segment_id = %id, "Current segment id set");
    }

    /// Parses `input` as a segment id and reseeds the stream with it.
    ///
    /// # Errors
    /// - `RelayError::InvalidId` - Input is empty, non-numeric or zero; state is unchanged
    pub fn set_current_id_str(&self, input: &str) -> Result<SegmentId> {
        let id: SegmentId = input.parse()?;
        self.set_current_id(id);
        Ok(id)
    }

    /// Starts the recurring discovery ticker.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// - `RelayError::CurrentIdNotSet` - No id to discover from
    pub fn start(&self) -> Result<StartOutcome> {
        if self.inner.state.read().current_id().is_none() {
            return Err(RelayError::CurrentIdNotSet);
        }

        let mut ticker = self.inner.ticker.lock();
        if ticker.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return Ok(StartOutcome::AlreadyRunning);
        }

        let relay = Arc::downgrade(&self.inner);
        let period = self.inner.config.discovery.tick_period;
        *ticker = Some(tokio::spawn(run_ticker(relay, period)));

        tracing::info!(tick_period_ms = period.as_millis() as u64, "Relay started");
        Ok(StartOutcome::Started)
    }

    /// Stops the ticker, cancelling any probe in flight.
    pub fn stop(&self) -> StopOutcome {
        let handle = self.inner.ticker.lock().take();
        match handle {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                tracing::info!("Relay stopped");
                StopOutcome::Stopped
            }
            _ => StopOutcome::NotRunning,
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .ticker
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn status(&self) -> RelayStatus {
        let running = self.is_running();
        let state = self.inner.state.read();

        RelayStatus {
            running,
            current_id: state.current_id(),
            segments_count: state.len(),
            media_sequence: state.media_sequence(),
        }
    }

    pub fn master_playlist(&self) -> String {
        render_master(&self.inner.config.playlist)
    }

    pub fn media_playlist(&self) -> String {
        let state = self.inner.state.read();
        render_media(&state, &self.inner.config.playlist)
    }

    /// Runs one scheduled discovery step.
    ///
    /// Skips when another tick is in flight or when the minimum probe
    /// interval has not elapsed. An admitted tick stamps the throttle even
    /// if discovery then fails. A result found for an id that was replaced
    /// while probing is discarded.
    pub async fn tick(&self) -> TickOutcome {
        let Ok(mut throttle) = self.inner.throttle.try_lock() else {
            tracing::trace!("Tick skipped, discovery already in flight");
            return TickOutcome::Busy;
        };

        if !throttle.try_begin(Instant::now()) {
            return TickOutcome::Throttled;
        }

        let (current, epoch) = {
            let state = self.inner.state.read();
            (state.current_id(), state.epoch())
        };
        let Some(current) = current else {
            return TickOutcome::NoCurrentId;
        };

        let Some(found) = self.inner.engine.discover_next(Some(current)).await else {
            tracing::warn!(current_id = %current, "No next segment found");
            return TickOutcome::Exhausted;
        };

        let segment = Segment::from_template(found, self.inner.engine.template());
        let (evicted, media_sequence) = {
            let mut state = self.inner.state.write();
            if state.epoch() != epoch {
                tracing::info!(
                    segment_id = %found,
                    "Discarding segment found for a replaced current id"
                );
                return TickOutcome::Superseded;
            }
            let evicted = state.append(segment);
            (evicted, state.media_sequence())
        };

        tracing::info!(segment_id = %found, media_sequence, evicted, "New segment");
        TickOutcome::Discovered(found)
    }
}

/// Drives `tick` at a fixed period until stopped or the relay is dropped.
///
/// Each tick is awaited before the next one is scheduled, and missed
/// periods are skipped rather than bunched up.
async fn run_ticker<P: SegmentProbe + 'static>(relay: Weak<RelayInner<P>>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::debug!("Relay ticker started");
    loop {
        interval.tick().await;
        let Some(inner) = relay.upgrade() else {
            break;
        };
        let outcome = RelayController { inner }.tick().await;
        if outcome.probed() {
            tracing::trace!(?outcome, "Discovery tick finished");
        }
    }
    tracing::debug!("Relay ticker exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::ScriptedProbe;

    const MIN_INTERVAL: Duration = Duration::from_secs(4);

    fn config() -> RelayConfig {
        let mut config = RelayConfig::default();
        config.origin.base_url = "http://origin.test/live/".to_string();
        config.origin.file_prefix = "cam_".to_string();
        config
    }

    fn relay_with(probe: &ScriptedProbe) -> RelayController<ScriptedProbe> {
        RelayController::new(config(), probe.clone()).unwrap()
    }

    fn probe() -> ScriptedProbe {
        ScriptedProbe::new(SegmentUrlTemplate::from_origin(&config().origin))
    }

    fn id(value: u64) -> SegmentId {
        SegmentId::new(value).unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = config();
        config.playlist.window_capacity = 0;
        let result = RelayController::new(config, probe());
        assert!(matches!(result, Err(RelayError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_start_without_current_id_is_rejected() {
        let relay = relay_with(&probe());

        assert!(matches!(relay.start(), Err(RelayError::CurrentIdNotSet)));
        assert!(!relay.is_running());
    }

    #[tokio::test]
    async fn test_stop_before_start_reports_not_running() {
        let relay = relay_with(&probe());
        assert_eq!(relay.stop(), StopOutcome::NotRunning);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_and_stop_are_idempotent() {
        let relay = relay_with(&probe());
        relay.set_current_id(id(100));

        assert_eq!(relay.start().unwrap(), StartOutcome::Started);
        assert_eq!(relay.start().unwrap(), StartOutcome::AlreadyRunning);
        assert!(relay.status().running);

        assert_eq!(relay.stop(), StopOutcome::Stopped);
        assert_eq!(relay.stop(), StopOutcome::NotRunning);
        assert!(!relay.status().running);
    }

    #[test]
    fn test_invalid_id_string_leaves_state_unchanged() {
        let relay = relay_with(&probe());
        relay.set_current_id(id(100));

        for input in ["", "abc", "-1", "0"] {
            assert!(matches!(
                relay.set_current_id_str(input),
                Err(RelayError::InvalidId { .. })
            ));
        }
        assert_eq!(relay.status().current_id, Some(id(100)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_discovery_scenario() {
        let probe = probe();
        probe.publish([5100]);
        let relay = relay_with(&probe);

        assert_eq!(relay.set_current_id_str("100").unwrap(), id(100));
        assert_eq!(relay.start().unwrap(), StartOutcome::Started);
        tokio::time::sleep(Duration::from_millis(500)).await;

        let status = relay.status();
        assert_eq!(
            status,
            RelayStatus {
                running: true,
                current_id: Some(id(5100)),
                segments_count: 1,
                media_sequence: 1,
            }
        );

        let playlist = relay.media_playlist();
        assert_eq!(playlist.matches("#EXTINF").count(), 1);
        assert!(playlist.contains("#EXTINF:5.000,\nhttp://origin.test/live/cam_5100.ts\n"));

        relay.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_inside_min_interval_probe_once() {
        let probe = probe();
        let relay = relay_with(&probe);
        relay.set_current_id(id(1000));

        assert_eq!(relay.tick().await, TickOutcome::Exhausted);
        assert_eq!(probe.probed_ids(), vec![6000, 5999, 6001, 5998, 6002]);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(relay.tick().await, TickOutcome::Throttled);
        assert_eq!(probe.probe_count(), 5);

        tokio::time::advance(MIN_INTERVAL).await;
        probe.publish([5999]);
        assert_eq!(relay.tick().await, TickOutcome::Discovered(id(5999)));
        assert_eq!(probe.probe_count(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nine_discoveries_evict_the_first() {
        let probe = probe();
        probe.publish((1..=9).map(|n| 1 + n * 5000));
        let relay = relay_with(&probe);
        relay.set_current_id(id(1));

        for n in 1..=9 {
            assert_eq!(
                relay.tick().await,
                TickOutcome::Discovered(id(1 + n * 5000))
            );
            tokio::time::advance(MIN_INTERVAL).await;
        }

        let status = relay.status();
        assert_eq!(status.media_sequence, 2);
        assert_eq!(status.segments_count, 8);

        let playlist = relay.media_playlist();
        assert!(playlist.contains("#EXT-X-MEDIA-SEQUENCE:2\n"));
        assert!(!playlist.contains("cam_5001.ts"));
        let first_url = playlist.lines().find(|line| line.starts_with("http")).unwrap();
        assert_eq!(first_url, "http://origin.test/live/cam_10001.ts");
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_current_id_resets_window() {
        let probe = probe();
        probe.publish([5100, 10100]);
        let relay = relay_with(&probe);
        relay.set_current_id(id(100));

        relay.tick().await;
        tokio::time::advance(MIN_INTERVAL).await;
        relay.tick().await;
        assert_eq!(relay.status().segments_count, 2);

        relay.set_current_id(id(777));
        let status = relay.status();
        assert_eq!(status.current_id, Some(id(777)));
        assert_eq!(status.segments_count, 0);
        assert_eq!(status.media_sequence, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_tick_is_busy() {
        let probe = probe().with_delay(Duration::from_millis(1500));
        probe.publish([6000]);
        let relay = relay_with(&probe);
        relay.set_current_id(id(1000));

        let background = relay.clone();
        let in_flight = tokio::spawn(async move { background.tick().await });
        tokio::task::yield_now().await;

        assert_eq!(relay.tick().await, TickOutcome::Busy);
        assert_eq!(in_flight.await.unwrap(), TickOutcome::Discovered(id(6000)));
        assert_eq!(probe.probe_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_while_probing_discards_result() {
        let probe = probe().with_delay(Duration::from_millis(1500));
        probe.publish([6000]);
        let relay = relay_with(&probe);
        relay.set_current_id(id(1000));

        let background = relay.clone();
        let in_flight = tokio::spawn(async move { background.tick().await });
        tokio::task::yield_now().await;

        relay.set_current_id(id(50));
        assert_eq!(in_flight.await.unwrap(), TickOutcome::Superseded);

        let status = relay.status();
        assert_eq!(status.current_id, Some(id(50)));
        assert_eq!(status.segments_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_respects_min_probe_interval() {
        let probe = probe();
        probe.publish([5001, 10001, 15001, 20001]);
        let relay = relay_with(&probe);
        relay.set_current_id(id(1));

        relay.start().unwrap();
        // Scheduler fires every second, but discovery may run only at 0s, 4s and 8s.
        tokio::time::sleep(Duration::from_millis(9500)).await;
        relay.stop();

        let status = relay.status();
        assert_eq!(status.segments_count, 3);
        assert_eq!(status.current_id, Some(id(15001)));
        assert_eq!(probe.probe_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_relay_makes_no_more_probes() {
        let probe = probe();
        let relay = relay_with(&probe);
        relay.set_current_id(id(1));

        relay.start().unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        let probes = probe.probe_count();
        assert_eq!(probes, 5);

        relay.stop();
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(probe.probe_count(), probes);
    }
}
