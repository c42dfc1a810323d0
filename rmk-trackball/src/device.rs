//! The trackball sensor and the task which polls it

use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Receiver;
use embassy_time::{Duration, Instant, Timer};
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;

use crate::config::TrackballConfig;
use crate::keycode::KeySink;
use crate::processor::{ControlEvent, TrackballProcessor};

/// Motion data from the sensor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionData {
    pub dx: i16,
    pub dy: i16,
}

/// Errors of the trackball sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// SPI communication error
    Spi,
    /// Invalid product ID detected
    InvalidProductId(u8),
    /// Initialization failed
    InitFailed,
    /// Invalid CPI value
    InvalidCpi,
}

/// Anything that accepts a new sensor resolution
pub trait ResolutionSink {
    async fn set_cpi(&mut self, cpi: u16) -> Result<(), SensorError>;
}

/// Driver of the optical sensor under the ball
pub trait MotionSensor: ResolutionSink {
    type MOTION: InputPin + Wait;

    async fn init(&mut self) -> Result<(), SensorError>;
    async fn read_motion(&mut self) -> Result<MotionData, SensorError>;
    fn motion_pending(&mut self) -> bool;
    fn motion_gpio(&mut self) -> Option<&mut Self::MOTION>;
}

/// Initialization state of the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitState {
    Pending,
    Initializing(u8),
    Ready,
    Failed,
}

/// TrackballDevice owns the sensor and feeds its motion, together with the
/// control key edges received from `controls`, into a [`TrackballProcessor`]
pub struct TrackballDevice<'a, S: MotionSensor, K: KeySink, M: RawMutex, const CN: usize, const RN: usize> {
    pub sensor: S,
    pub processor: TrackballProcessor<'a, K, M, RN>,
    pub init_state: InitState,
    pub poll_interval: Duration,
    controls: Receiver<'a, M, ControlEvent, CN>,
    last_poll: Instant,
}

impl<'a, S, K, M, const CN: usize, const RN: usize> TrackballDevice<'a, S, K, M, CN, RN>
where
    S: MotionSensor,
    K: KeySink,
    M: RawMutex,
{
    pub const MAX_INIT_RETRIES: u8 = 3;

    pub fn new(
        sensor: S,
        processor: TrackballProcessor<'a, K, M, RN>,
        controls: Receiver<'a, M, ControlEvent, CN>,
        config: &TrackballConfig,
    ) -> Self {
        Self {
            sensor,
            processor,
            init_state: InitState::Pending,
            poll_interval: Duration::from_millis(config.poll_interval_ms as u64),
            controls,
            last_poll: Instant::MIN,
        }
    }

    /// Try to bring the sensor up, a failed attempt is retried on the next poll
    async fn try_init(&mut self) -> bool {
        let retry_count = match self.init_state {
            InitState::Ready => return true,
            InitState::Failed => return false,
            InitState::Pending => 0,
            InitState::Initializing(retry_count) => retry_count,
        };

        info!("Trackball: Initializing sensor (attempt {})", retry_count + 1);
        match self.sensor.init().await {
            Ok(()) => {
                self.init_state = InitState::Ready;
                let cpi = self.processor.quantizer().cpi();
                if let Err(e) = self.sensor.set_cpi(cpi).await {
                    warn!("Trackball: Failed to set cpi to {}: {:?}", cpi, e);
                }
                info!("Trackball: Sensor initialized, cpi {}", cpi);
                true
            }
            Err(e) => {
                error!("Trackball: Init failed: {:?}", e);
                if retry_count + 1 >= Self::MAX_INIT_RETRIES {
                    error!("Trackball: Max retries reached, giving up");
                    self.init_state = InitState::Failed;
                } else {
                    self.init_state = InitState::Initializing(retry_count + 1);
                }
                false
            }
        }
    }

    /// Run one poll cycle.
    ///
    /// The processor sees every cycle, also those without motion, so a held
    /// zoom modifier is released once the ball stops.
    pub async fn poll_once(&mut self) {
        if self.init_state != InitState::Ready && !self.try_init().await {
            return;
        }

        let motion = if self.sensor.motion_pending() {
            match self.sensor.read_motion().await {
                Ok(motion) => motion,
                Err(e) => {
                    warn!("Trackball: Read motion error: {:?}", e);
                    return;
                }
            }
        } else {
            MotionData::default()
        };
        self.processor.on_motion(motion).await;
    }

    pub async fn handle_control(&mut self, event: ControlEvent) {
        debug!("Trackball control: {:?}", event);
        self.processor.on_control(event, &mut self.sensor).await;
    }

    /// Poll the sensor and handle control events, forever.
    ///
    /// Cycles start when the motion pin goes low, or on the poll timer while
    /// the sensor is initializing, has no motion pin or Ctrl is held. Either
    /// way cycles are at least `poll_interval` apart. Once the sensor has
    /// failed only control events are handled.
    pub async fn run(&mut self) -> ! {
        if self.last_poll == Instant::MIN {
            self.last_poll = Instant::now();
        }

        loop {
            let event = {
                let init_state = self.init_state;
                // The release of a held Ctrl needs a cycle without motion
                let use_motion_pin = !self.processor.zoom_modifier_held();
                let next_poll = self.last_poll + self.poll_interval;
                let sensor = &mut self.sensor;
                let poll_wait = async move {
                    match init_state {
                        InitState::Failed => core::future::pending::<()>().await,
                        InitState::Ready if use_motion_pin => {
                            if let Some(gpio) = sensor.motion_gpio() {
                                let _ = gpio.wait_for_low().await;
                            }
                        }
                        _ => {}
                    }
                    Timer::at(next_poll).await;
                };
                select(poll_wait, self.controls.receive()).await
            };

            match event {
                Either::First(_) => {
                    self.poll_once().await;
                    self.last_poll = Instant::now();
                }
                Either::Second(event) => self.handle_control(event).await,
            }
        }
    }
}
