use crate::time::{FrameClock, FrameTime};

use super::{
    DeviceProvider, FrameControl, FrameHandle, FrameInput, FrameScheduler, LifecycleError,
    LifecycleState, Scene,
};

/// Device-dependent state, populated together or not at all.
struct Resources<C, A, P> {
    context: C,
    assets: A,
    pipeline: P,
}

/// Owns the device context, scene resources and frame scheduling of one scene.
///
/// - `P` supplies the device context
/// - `S` is the injected capability set (`load_assets`, `build_pipeline`, `render`)
/// - `F` schedules and cancels frames
///
/// Accumulated time survives `restart`; only a new lifecycle starts from zero.
pub struct RendererLifecycle<P, S, F>
where
    P: DeviceProvider,
    S: Scene<Context = P::Context>,
    F: FrameScheduler,
{
    provider: P,
    scene: S,
    config: S::Config,
    scheduler: F,

    state: LifecycleState,
    resources: Option<Resources<P::Context, S::Assets, S::Pipeline>>,

    /// Handle of the next scheduled frame; `Some` iff scheduling is active.
    handle: Option<FrameHandle>,

    clock: FrameClock,
    last_frame: Option<FrameTime>,
}

impl<P, S, F> RendererLifecycle<P, S, F>
where
    P: DeviceProvider,
    S: Scene<Context = P::Context>,
    F: FrameScheduler,
{
    /// Creates an empty lifecycle. Nothing is acquired until `initialize`.
    pub fn new(provider: P, scene: S, config: S::Config, scheduler: F) -> Self {
        Self {
            provider,
            scene,
            config,
            scheduler,
            state: LifecycleState::Uninitialized,
            resources: None,
            handle: None,
            clock: FrameClock::new(),
            last_frame: None,
        }
    }

    /// Acquires the device, loads assets and builds the pipeline.
    ///
    /// On failure the lifecycle stays `Uninitialized` and the error is returned;
    /// `Unsupported` means the platform cannot render this scene at all.
    pub async fn initialize(&mut self) -> Result<(), LifecycleError> {
        if self.state != LifecycleState::Uninitialized {
            return Err(self.invalid("initialize"));
        }
        self.prepare().await
    }

    /// Begins frame dispatch. No-op if already scheduled or not initialized.
    pub fn start_rendering(&mut self) {
        if self.handle.is_some() {
            return;
        }
        if self.resources.is_none() {
            log::debug!("start_rendering ignored while {:?}", self.state);
            return;
        }

        self.handle = Some(self.scheduler.request_frame());
        self.state = LifecycleState::Running;
        log::debug!("rendering started");
    }

    /// Cancels the scheduled frame, if any. A frame already running completes.
    pub fn stop_rendering(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.scheduler.cancel_frame(handle);
            log::debug!("rendering stopped");
        }
        if matches!(self.state, LifecycleState::Ready | LifecycleState::Running) {
            self.state = LifecycleState::Stopped;
        }
    }

    /// Stops, rebuilds all device-dependent state and resumes rendering.
    ///
    /// Used after a configuration change that affects pipeline construction.
    /// Accumulated time is kept. On failure the lifecycle is `Uninitialized`.
    pub async fn restart(&mut self) -> Result<(), LifecycleError> {
        if !self.state.is_initialized() {
            return Err(self.invalid("restart"));
        }

        self.stop_rendering();
        self.state = LifecycleState::Restarting;
        log::info!("restarting renderer");

        // The old surface must be released before a new one is created for the
        // same target.
        self.resources = None;

        self.prepare().await?;
        self.start_rendering();
        Ok(())
    }

    /// Dispatches one scheduled frame.
    ///
    /// `fired` is the handle the scheduler fired with; a handle that is no
    /// longer current (cancelled by `stop_rendering` or superseded by a restart)
    /// is ignored. The next frame is requested only if the lifecycle is still
    /// `Running` after the render hook returns.
    ///
    /// A render hook error stops scheduling and is returned.
    pub fn run_frame(&mut self, fired: FrameHandle, timestamp_ms: f64) -> Result<(), LifecycleError> {
        if self.handle != Some(fired) {
            log::trace!("ignoring stale frame {}", fired.id());
            return Ok(());
        }
        self.handle = None;

        let Some(resources) = self.resources.as_mut() else {
            self.state = LifecycleState::Uninitialized;
            return Err(LifecycleError::InvalidState {
                op: "run_frame",
                state: self.state,
            });
        };

        let time = self.clock.tick(timestamp_ms);
        self.last_frame = Some(time);

        let input = FrameInput {
            context: &mut resources.context,
            assets: &resources.assets,
            pipeline: &resources.pipeline,
            config: &self.config,
            time,
        };

        match self.scene.render(input) {
            Ok(FrameControl::Continue) => {}
            Ok(FrameControl::Stop) => {
                log::debug!("scene requested stop at frame {}", time.frame_index);
                self.state = LifecycleState::Stopped;
            }
            Err(err) => {
                log::error!("frame {} failed: {err:#}", time.frame_index);
                self.state = LifecycleState::Stopped;
                return Err(LifecycleError::Frame {
                    frame_index: time.frame_index,
                    source: err.into(),
                });
            }
        }

        if self.state == LifecycleState::Running {
            self.handle = Some(self.scheduler.request_frame());
        }
        Ok(())
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// `true` while a frame is scheduled.
    pub fn is_scheduled(&self) -> bool {
        self.handle.is_some()
    }

    pub fn scheduled_frame(&self) -> Option<FrameHandle> {
        self.handle
    }

    /// Timing of the most recently dispatched frame.
    pub fn last_frame(&self) -> Option<FrameTime> {
        self.last_frame
    }

    /// Accumulated frame time in seconds.
    pub fn total_time(&self) -> f32 {
        self.clock.total()
    }

    pub fn config(&self) -> &S::Config {
        &self.config
    }

    /// Mutable configuration. Pipeline-affecting changes need a `restart`.
    pub fn config_mut(&mut self) -> &mut S::Config {
        &mut self.config
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Scene and configuration together, for input handlers that update both.
    pub fn scene_and_config_mut(&mut self) -> (&mut S, &mut S::Config) {
        (&mut self.scene, &mut self.config)
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    /// Device context, once initialized.
    pub fn context(&self) -> Option<&P::Context> {
        self.resources.as_ref().map(|r| &r.context)
    }

    pub fn context_mut(&mut self) -> Option<&mut P::Context> {
        self.resources.as_mut().map(|r| &mut r.context)
    }

    async fn prepare(&mut self) -> Result<(), LifecycleError> {
        self.state = LifecycleState::Initializing;

        match self.acquire_resources().await {
            Ok(resources) => {
                self.resources = Some(resources);
                self.state = LifecycleState::Ready;
                log::debug!("renderer ready");
                Ok(())
            }
            Err(err) => {
                log::warn!("renderer initialization failed: {err}");
                self.state = LifecycleState::Uninitialized;
                Err(err)
            }
        }
    }

    async fn acquire_resources(
        &mut self,
    ) -> Result<Resources<P::Context, S::Assets, S::Pipeline>, LifecycleError> {
        let context = self.provider.acquire().await?;
        let assets = self.scene.load_assets(&context, &self.config)?;
        let pipeline = self.scene.build_pipeline(&context, &assets, &self.config)?;

        Ok(Resources {
            context,
            assets,
            pipeline,
        })
    }

    fn invalid(&self, op: &'static str) -> LifecycleError {
        LifecycleError::InvalidState {
            op,
            state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::FrameQueue;

    // ── fixtures ──────────────────────────────────────────────────────────

    #[derive(Default)]
    struct TestProvider {
        fail: bool,
        acquisitions: u32,
    }

    impl DeviceProvider for TestProvider {
        type Context = u32;

        async fn acquire(&mut self) -> Result<u32, LifecycleError> {
            if self.fail {
                return Err(LifecycleError::unsupported("no adapter"));
            }
            self.acquisitions += 1;
            Ok(self.acquisitions)
        }
    }

    #[derive(Debug, Default, Clone, Copy, PartialEq)]
    struct TestConfig {
        cull: u8,
    }

    #[derive(Default)]
    struct TestScene {
        calls: Vec<&'static str>,
        frames: Vec<(u32, u8, FrameTime)>,
        missing_asset: bool,
        stop_at: Option<u64>,
        fail_at: Option<u64>,
    }

    impl Scene for TestScene {
        type Context = u32;
        type Config = TestConfig;
        type Assets = u32;
        type Pipeline = u8;

        fn load_assets(&mut self, context: &u32, _: &TestConfig) -> Result<u32, LifecycleError> {
            self.calls.push("load_assets");
            if self.missing_asset {
                let io = std::io::Error::new(std::io::ErrorKind::NotFound, "mesh.bin");
                return Err(LifecycleError::asset_load("mesh", io));
            }
            Ok(*context)
        }

        fn build_pipeline(
            &mut self,
            _: &u32,
            _: &u32,
            config: &TestConfig,
        ) -> Result<u8, LifecycleError> {
            self.calls.push("build_pipeline");
            Ok(config.cull)
        }

        fn render(&mut self, frame: FrameInput<'_, Self>) -> anyhow::Result<FrameControl> {
            self.calls.push("render");
            let index = frame.time.frame_index;
            self.frames.push((*frame.context, *frame.pipeline, frame.time));
            if self.fail_at == Some(index) {
                anyhow::bail!("device lost");
            }
            if self.stop_at == Some(index) {
                return Ok(FrameControl::Stop);
            }
            Ok(FrameControl::Continue)
        }
    }

    type TestLifecycle = RendererLifecycle<TestProvider, TestScene, FrameQueue>;

    fn lifecycle() -> TestLifecycle {
        RendererLifecycle::new(
            TestProvider::default(),
            TestScene::default(),
            TestConfig::default(),
            FrameQueue::new(),
        )
    }

    fn ready() -> TestLifecycle {
        let mut lc = lifecycle();
        pollster::block_on(lc.initialize()).unwrap();
        lc
    }

    /// Fires the oldest pending frame at `ts`.
    fn fire(lc: &mut TestLifecycle, ts: f64) -> Result<(), LifecycleError> {
        let handle = lc.scheduler_mut().take_due().expect("no frame pending");
        lc.run_frame(handle, ts)
    }

    // ── initialize ────────────────────────────────────────────────────────

    #[test]
    fn initialize_orders_hooks_and_becomes_ready() {
        let lc = ready();
        assert_eq!(lc.state(), LifecycleState::Ready);
        assert_eq!(lc.scene().calls, ["load_assets", "build_pipeline"]);
        assert_eq!(lc.context(), Some(&1));
        assert!(!lc.is_scheduled());
    }

    #[test]
    fn unsupported_device_leaves_lifecycle_uninitialized() {
        let mut lc = RendererLifecycle::new(
            TestProvider { fail: true, ..Default::default() },
            TestScene::default(),
            TestConfig::default(),
            FrameQueue::new(),
        );

        let err = pollster::block_on(lc.initialize()).unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(lc.state(), LifecycleState::Uninitialized);
        assert!(lc.scene().calls.is_empty());

        lc.start_rendering();
        assert!(!lc.is_scheduled());
        assert_eq!(lc.scheduler().pending(), 0);
        assert_eq!(lc.state(), LifecycleState::Uninitialized);
    }

    #[test]
    fn asset_failure_propagates_and_skips_pipeline() {
        let mut lc = RendererLifecycle::new(
            TestProvider::default(),
            TestScene { missing_asset: true, ..Default::default() },
            TestConfig::default(),
            FrameQueue::new(),
        );

        let err = pollster::block_on(lc.initialize()).unwrap_err();
        assert!(matches!(err, LifecycleError::AssetLoad { .. }));
        assert_eq!(lc.state(), LifecycleState::Uninitialized);
        assert_eq!(lc.scene().calls, ["load_assets"]);
        assert!(lc.context().is_none());
    }

    #[test]
    fn second_initialize_is_rejected() {
        let mut lc = ready();
        let err = pollster::block_on(lc.initialize()).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidState { op: "initialize", state: LifecycleState::Ready }
        ));
    }

    // ── start / stop ──────────────────────────────────────────────────────

    #[test]
    fn handle_tracks_most_recent_start_or_stop() {
        let mut lc = ready();
        let script = [true, true, false, false, true, false, true, true, true, false, true];

        for start in script {
            if start {
                lc.start_rendering();
            } else {
                lc.stop_rendering();
            }
            assert_eq!(lc.is_scheduled(), start);
            assert_eq!(lc.scheduler().pending(), usize::from(start));
        }
    }

    #[test]
    fn repeated_start_keeps_one_handle() {
        let mut lc = ready();
        lc.start_rendering();
        let first = lc.scheduled_frame();
        lc.start_rendering();
        assert_eq!(lc.scheduled_frame(), first);
        assert_eq!(lc.state(), LifecycleState::Running);
    }

    #[test]
    fn stop_before_start_moves_ready_to_stopped() {
        let mut lc = ready();
        lc.stop_rendering();
        assert_eq!(lc.state(), LifecycleState::Stopped);
        lc.start_rendering();
        assert_eq!(lc.state(), LifecycleState::Running);
    }

    // ── frame dispatch ────────────────────────────────────────────────────

    #[test]
    fn frames_rearm_while_running() {
        let mut lc = ready();
        lc.start_rendering();

        fire(&mut lc, 1000.0).unwrap();
        fire(&mut lc, 1500.0).unwrap();
        fire(&mut lc, 1750.0).unwrap();

        let times: Vec<_> = lc.scene().frames.iter().map(|(_, _, t)| (t.dt, t.total)).collect();
        assert_eq!(times, [(0.0, 0.0), (0.5, 0.5), (0.25, 0.75)]);
        assert!(lc.is_scheduled());
        assert_eq!(lc.scheduler().pending(), 1);
    }

    #[test]
    fn stale_handle_after_stop_is_ignored() {
        let mut lc = ready();
        lc.start_rendering();
        let in_flight = lc.scheduled_frame().unwrap();

        lc.stop_rendering();
        lc.run_frame(in_flight, 16.0).unwrap();

        assert!(lc.scene().frames.is_empty());
        assert!(!lc.is_scheduled());
        assert_eq!(lc.scheduler().pending(), 0);
    }

    #[test]
    fn stop_requested_by_frame_prevents_rearm() {
        let mut lc = RendererLifecycle::new(
            TestProvider::default(),
            TestScene { stop_at: Some(1), ..Default::default() },
            TestConfig::default(),
            FrameQueue::new(),
        );
        pollster::block_on(lc.initialize()).unwrap();
        lc.start_rendering();

        fire(&mut lc, 0.0).unwrap();
        fire(&mut lc, 16.0).unwrap();

        assert_eq!(lc.scene().frames.len(), 2);
        assert_eq!(lc.state(), LifecycleState::Stopped);
        assert!(!lc.is_scheduled());
        assert_eq!(lc.scheduler().pending(), 0);
    }

    #[test]
    fn failing_frame_stops_scheduling() {
        let mut lc = RendererLifecycle::new(
            TestProvider::default(),
            TestScene { fail_at: Some(0), ..Default::default() },
            TestConfig::default(),
            FrameQueue::new(),
        );
        pollster::block_on(lc.initialize()).unwrap();
        lc.start_rendering();

        let err = fire(&mut lc, 0.0).unwrap_err();
        assert!(matches!(err, LifecycleError::Frame { frame_index: 0, .. }));
        assert_eq!(lc.state(), LifecycleState::Stopped);
        assert!(!lc.is_scheduled());
    }

    #[test]
    fn time_is_not_advanced_while_stopped_without_ticks() {
        let mut lc = ready();
        lc.start_rendering();
        fire(&mut lc, 0.0).unwrap();
        fire(&mut lc, 100.0).unwrap();
        lc.stop_rendering();

        lc.start_rendering();
        fire(&mut lc, 2100.0).unwrap();

        // The stopped gap lands in the next frame's dt.
        let last = lc.last_frame().unwrap();
        assert_eq!(last.dt, 2.0);
        assert!((lc.total_time() - 2.1).abs() < 1e-6);
    }

    // ── restart ───────────────────────────────────────────────────────────

    #[test]
    fn restart_while_running_leaves_one_handle() {
        let mut lc = ready();
        lc.start_rendering();
        fire(&mut lc, 0.0).unwrap();

        pollster::block_on(lc.restart()).unwrap();

        assert_eq!(lc.state(), LifecycleState::Running);
        assert!(lc.is_scheduled());
        assert_eq!(lc.scheduler().pending(), 1);
    }

    #[test]
    fn restart_reacquires_and_rebuilds_with_new_config() {
        let mut lc = ready();
        lc.start_rendering();
        lc.config_mut().cull = 2;

        pollster::block_on(lc.restart()).unwrap();
        fire(&mut lc, 0.0).unwrap();

        assert_eq!(lc.context(), Some(&2));
        assert_eq!(
            lc.scene().calls,
            ["load_assets", "build_pipeline", "load_assets", "build_pipeline", "render"]
        );
        let (ctx, pipeline, _) = lc.scene().frames[0];
        assert_eq!((ctx, pipeline), (2, 2));
    }

    #[test]
    fn restart_keeps_accumulated_time() {
        let mut lc = ready();
        lc.start_rendering();
        fire(&mut lc, 0.0).unwrap();
        fire(&mut lc, 1000.0).unwrap();

        pollster::block_on(lc.restart()).unwrap();
        fire(&mut lc, 1500.0).unwrap();

        assert_eq!(lc.total_time(), 1.5);
    }

    #[test]
    fn restart_from_stopped_resumes() {
        let mut lc = ready();
        lc.start_rendering();
        lc.stop_rendering();

        pollster::block_on(lc.restart()).unwrap();
        assert_eq!(lc.state(), LifecycleState::Running);
    }

    #[test]
    fn frame_from_before_restart_is_stale() {
        let mut lc = ready();
        lc.start_rendering();
        let old = lc.scheduled_frame().unwrap();

        pollster::block_on(lc.restart()).unwrap();
        lc.run_frame(old, 0.0).unwrap();

        assert!(lc.scene().frames.is_empty());
        assert_eq!(lc.scheduler().pending(), 1);
    }

    #[test]
    fn failed_restart_ends_uninitialized() {
        let mut lc = ready();
        lc.start_rendering();
        lc.provider.fail = true;

        let err = pollster::block_on(lc.restart()).unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(lc.state(), LifecycleState::Uninitialized);
        assert!(!lc.is_scheduled());
        assert!(lc.context().is_none());

        lc.start_rendering();
        assert!(!lc.is_scheduled());
    }

    #[test]
    fn restart_before_initialize_is_rejected() {
        let mut lc = lifecycle();
        let err = pollster::block_on(lc.restart()).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidState { op: "restart", .. }));
    }
}
