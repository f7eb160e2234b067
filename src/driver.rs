//! Rotary encoder driver.
//!
//! [`RotaryEncoderDriver`] samples the `clk`/`dt` pair of a mechanical
//! quadrature encoder at a fixed interval, feeds each pair to a
//! [`Decoder`], keeps a running position and publishes an
//! [`EncoderEvent`] for every detected step or failed read.

use core::cell::Cell;

use embassy_futures::join::join;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::pubsub::Error as PubSubError;
use heapless::String;

use crate::button::ButtonDriver;
use crate::config::{ButtonConfig, EncoderConfig};
use crate::decoder::Decoder;
use crate::error::{ConfigError, PinReadError};
use crate::event::{EncoderChannel, EncoderEvent, EncoderSubscriber};
use crate::lifecycle::Lifecycle;
use crate::pin::{DigitalReader, PinId, PinLevel};

/// Maximum length of a driver name in bytes.
pub const NAME_CAPACITY: usize = 32;

/// Name given to new drivers.
pub const DEFAULT_NAME: &str = "RotaryEncoder";

/// Polling driver for a mechanical rotary encoder with a push button.
///
/// The driver borrows its pin connection and never owns it; the
/// connection must outlive the driver.
///
/// # Lifecycle
///
/// 1. [`RotaryEncoderDriver::new()`]: validates the configuration. No pin
///    is read.
/// 2. [`RotaryEncoderDriver::run()`]: starts the button sub-driver, then the
///    sampler. Spawn it from a concrete task.
/// 3. [`RotaryEncoderDriver::halt()`]: stops the sampler and returns once it
///    has stopped reading pins. The button is halted separately through
///    [`button()`](Self::button).
///
/// Position and decoder state are only written by the sampler. Observe
/// them through [`subscribe()`](Self::subscribe).
///
/// # Example
///
/// ```ignore
/// type Encoder = RotaryEncoderDriver<'static, CriticalSectionRawMutex, Pins>;
/// static ENCODER: StaticCell<Encoder> = StaticCell::new();
///
/// let config = EncoderConfig::new(PinId::new("clk"), PinId::new("dt"), PinId::new("sw"));
/// let encoder = ENCODER.init(RotaryEncoderDriver::new(pins, config).unwrap());
/// spawner.spawn(encoder_task(encoder).unwrap());
///
/// #[embassy_executor::task]
/// async fn encoder_task(encoder: &'static Encoder) {
///     encoder.run().await;
/// }
/// ```
pub struct RotaryEncoderDriver<'a, M: RawMutex, R: DigitalReader> {
    name: String<NAME_CAPACITY>,
    connection: &'a R,
    config: EncoderConfig,
    button: ButtonDriver<'a, M, R>,
    events: EncoderChannel<M, R::Error>,
    position: Mutex<M, Cell<i32>>,
    lifecycle: Lifecycle<M>,
}

impl<'a, M: RawMutex, R: DigitalReader> RotaryEncoderDriver<'a, M, R> {
    /// Create a stopped driver with a default button on `config.sw_pin`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the interval is zero or pins repeat.
    pub fn new(connection: &'a R, config: EncoderConfig) -> Result<Self, ConfigError> {
        Self::with_button_config(connection, config, config.button_config())
    }

    /// Create a stopped driver with a custom button configuration.
    ///
    /// `button_config.pin` replaces `config.sw_pin`.
    pub fn with_button_config(
        connection: &'a R,
        mut config: EncoderConfig,
        button_config: ButtonConfig,
    ) -> Result<Self, ConfigError> {
        config.sw_pin = button_config.pin;
        config.validate()?;

        let mut driver = Self {
            name: String::new(),
            connection,
            config,
            button: ButtonDriver::new(connection, button_config)?,
            events: EncoderChannel::new(),
            position: Mutex::new(Cell::new(0)),
            lifecycle: Lifecycle::new(),
        };
        driver.set_name(DEFAULT_NAME);
        Ok(driver)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the driver. Names longer than [`NAME_CAPACITY`] bytes are
    /// truncated at a character boundary.
    pub fn set_name(&mut self, name: &str) {
        self.name.clear();
        for c in name.chars() {
            if self.name.push(c).is_err() {
                break;
            }
        }
    }

    /// The connection the pins are read through.
    pub fn connection(&self) -> &'a R {
        self.connection
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// The push-button sub-driver.
    pub fn button(&self) -> &ButtonDriver<'a, M, R> {
        &self.button
    }

    /// Position as of the last published rotation.
    pub fn position(&self) -> i32 {
        self.position.lock(|position| position.get())
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    /// Subscribe to rotation and error notifications.
    ///
    /// # Errors
    ///
    /// Returns [`PubSubError::MaximumSubscribersReached`] once
    /// [`MAX_SUBSCRIBERS`](crate::MAX_SUBSCRIBERS) subscribers exist.
    pub fn subscribe(&self) -> Result<EncoderSubscriber<'_, M, R::Error>, PubSubError> {
        self.events.subscriber()
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Start the button sub-driver, then the sampler, and poll both.
    ///
    /// Completes once the sampler and the button have both been halted.
    pub async fn run(&self) {
        join(self.button.run(), self.run_sampler()).await;
    }

    /// Sampler loop without the button.
    ///
    /// Returns at once if a sampler is already running for this driver.
    pub async fn run_sampler(&self) {
        if !self.lifecycle.begin() {
            #[cfg(feature = "defmt")]
            defmt::warn!("{}: sampler already running", self.name.as_str());
            return;
        }

        #[cfg(feature = "defmt")]
        defmt::info!(
            "{}: sampling {} / {} every {} us",
            self.name.as_str(),
            self.config.clk_pin.as_str(),
            self.config.dt_pin.as_str(),
            self.config.interval.as_micros()
        );

        let mut decoder = Decoder::new();
        loop {
            self.sample(&mut decoder);

            if self.lifecycle.sleep_or_stop(self.config.interval).await {
                break;
            }
        }

        self.lifecycle.finish();

        #[cfg(feature = "defmt")]
        defmt::info!("{}: sampler halted", self.name.as_str());
    }

    /// Stop the sampler and wait until it has stopped reading pins.
    ///
    /// Returns immediately if the sampler is not running. Only one task may
    /// halt a driver at a time.
    pub async fn halt(&self) {
        self.lifecycle.halt().await;
    }

    // -----------------------------------------------------------------------
    // Sampling
    // -----------------------------------------------------------------------

    /// One sampler cycle.
    ///
    /// Both pins are always read. If either read fails the error is
    /// published and decoding is skipped for this cycle.
    fn sample(&self, decoder: &mut Decoder) {
        let clk = self.read_pin(self.config.clk_pin);
        let dt = self.read_pin(self.config.dt_pin);
        let (Some(clk), Some(dt)) = (clk, dt) else {
            return;
        };

        if let Some(direction) = decoder.update(clk, dt) {
            let position = self.position.lock(|position| {
                let next = position.get().wrapping_add(direction.delta());
                position.set(next);
                next
            });

            #[cfg(feature = "defmt")]
            defmt::debug!("{}: {} -> {}", self.name.as_str(), direction, position);

            self.events
                .immediate_publisher()
                .publish_immediate(EncoderEvent::Rotation { direction, position });
        }
    }

    fn read_pin(&self, pin: PinId) -> Option<PinLevel> {
        match self.connection.digital_read(pin) {
            Ok(level) => Some(level),
            Err(error) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("{}: failed to read {}", self.name.as_str(), pin.as_str());

                self.events
                    .immediate_publisher()
                    .publish_immediate(EncoderEvent::Error(PinReadError { pin, error }));
                None
            }
        }
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::Direction;
    use crate::pin::PinLevel::{High, Low};
    use core::cell::RefCell;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_time::Duration;

    const CLK: PinId = PinId::new("clk");
    const DT: PinId = PinId::new("dt");
    const SW: PinId = PinId::new("sw");

    type Reading = Result<PinLevel, &'static str>;
    type Event = EncoderEvent<&'static str>;

    /// Serves one `(clk, dt)` pair per cycle, in order.
    struct Pairs {
        pairs: RefCell<Vec<(Reading, Reading)>>,
        current: Cell<(Reading, Reading)>,
    }

    impl Pairs {
        fn new(pairs: &[(Reading, Reading)]) -> Self {
            let mut pairs = pairs.to_vec();
            pairs.reverse();
            Self {
                pairs: RefCell::new(pairs),
                current: Cell::new((Ok(High), Ok(High))),
            }
        }
    }

    impl DigitalReader for Pairs {
        type Error = &'static str;

        fn digital_read(&self, pin: PinId) -> Reading {
            if pin == CLK {
                if let Some(pair) = self.pairs.borrow_mut().pop() {
                    self.current.set(pair);
                }
                self.current.get().0
            } else if pin == DT {
                self.current.get().1
            } else {
                Ok(Low)
            }
        }
    }

    fn levels(pairs: &[(u8, u8)]) -> Vec<(Reading, Reading)> {
        pairs
            .iter()
            .map(|&(clk, dt)| (Ok(PinLevel::from(clk == 1)), Ok(PinLevel::from(dt == 1))))
            .collect()
    }

    fn driver(pairs: &Pairs) -> RotaryEncoderDriver<'_, NoopRawMutex, Pairs> {
        RotaryEncoderDriver::new(pairs, EncoderConfig::new(CLK, DT, SW)).unwrap()
    }

    fn drain(sub: &mut EncoderSubscriber<'_, NoopRawMutex, &'static str>) -> Vec<Event> {
        core::iter::from_fn(|| sub.try_next_message_pure()).collect()
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn new_driver_defaults() {
        let pairs = Pairs::new(&[]);
        let encoder = driver(&pairs);

        assert!(DEFAULT_NAME.len() <= NAME_CAPACITY);
        assert_eq!(encoder.name(), DEFAULT_NAME);
        assert_eq!(encoder.position(), 0);
        assert!(!encoder.is_running());
        assert_eq!(encoder.config().interval, Duration::from_millis(1));
        assert_eq!(encoder.button().pin(), SW);
        assert!(core::ptr::eq(encoder.connection(), &pairs));
    }

    #[test]
    fn invalid_config_rejected() {
        let pairs = Pairs::new(&[]);
        let config = EncoderConfig::new(CLK, DT, SW).with_interval(Duration::from_ticks(0));
        assert!(matches!(
            RotaryEncoderDriver::<NoopRawMutex, _>::new(&pairs, config),
            Err(ConfigError::ZeroInterval)
        ));
    }

    #[test]
    fn custom_button_replaces_sw_pin() {
        let pairs = Pairs::new(&[]);
        let button = ButtonConfig::new(PinId::new("knob")).active_low();
        let encoder = RotaryEncoderDriver::<NoopRawMutex, _>::with_button_config(
            &pairs,
            EncoderConfig::new(CLK, DT, SW),
            button,
        )
        .unwrap();

        assert_eq!(encoder.config().sw_pin, PinId::new("knob"));
        assert_eq!(encoder.button().config().default_level, High);
    }

    #[test]
    fn set_name_truncates() {
        let pairs = Pairs::new(&[]);
        let mut encoder = driver(&pairs);

        encoder.set_name("Volume");
        assert_eq!(encoder.name(), "Volume");

        encoder.set_name("a-very-long-encoder-name-that-does-not-fit");
        assert_eq!(encoder.name().len(), NAME_CAPACITY);
        assert!(encoder.name().starts_with("a-very-long-encoder-name"));
    }

    // ── Sampling ─────────────────────────────────────────────────────

    #[test]
    fn one_detent_one_rotation() {
        let pairs = Pairs::new(&levels(&[(1, 1), (0, 1), (0, 0), (1, 0), (1, 1)]));
        let encoder = driver(&pairs);
        let mut sub = encoder.subscribe().unwrap();
        let mut decoder = Decoder::new();

        for _ in 0..5 {
            encoder.sample(&mut decoder);
        }

        assert_eq!(
            drain(&mut sub),
            [EncoderEvent::Rotation {
                direction: Direction::Clockwise,
                position: 1,
            }]
        );
        assert_eq!(encoder.position(), 1);
    }

    #[test]
    fn clockwise_edges_accumulate() {
        // Each (0, 1) after a (1, x) is one clockwise edge.
        let pairs = Pairs::new(&levels(&[(0, 1), (1, 1), (0, 1), (1, 1), (0, 1)]));
        let encoder = driver(&pairs);
        let mut decoder = Decoder::new();

        for _ in 0..5 {
            encoder.sample(&mut decoder);
        }

        assert_eq!(encoder.position(), 3);
    }

    #[test]
    fn opposite_edges_return_to_start() {
        let pairs = Pairs::new(&levels(&[(0, 1), (1, 1), (0, 0)]));
        let encoder = driver(&pairs);
        let mut sub = encoder.subscribe().unwrap();
        let mut decoder = Decoder::new();

        for _ in 0..3 {
            encoder.sample(&mut decoder);
        }

        assert_eq!(
            drain(&mut sub),
            [
                EncoderEvent::Rotation {
                    direction: Direction::Clockwise,
                    position: 1,
                },
                EncoderEvent::Rotation {
                    direction: Direction::CounterClockwise,
                    position: 0,
                },
            ]
        );
        assert_eq!(encoder.position(), 0);
    }

    #[test]
    fn failed_read_skips_decoding() {
        let pairs = Pairs::new(&[(Ok(Low), Err("dt fault")), (Ok(Low), Ok(High))]);
        let encoder = driver(&pairs);
        let mut sub = encoder.subscribe().unwrap();
        let mut decoder = Decoder::new();

        encoder.sample(&mut decoder);
        assert_eq!(
            drain(&mut sub),
            [EncoderEvent::Error(PinReadError {
                pin: DT,
                error: "dt fault",
            })]
        );
        assert_eq!(decoder.last_clk(), High);
        assert_eq!(encoder.position(), 0);

        // The clk edge is still pending and is decoded on the next cycle.
        encoder.sample(&mut decoder);
        assert_eq!(
            drain(&mut sub),
            [EncoderEvent::Rotation {
                direction: Direction::Clockwise,
                position: 1,
            }]
        );
    }

    #[test]
    fn both_reads_failing_report_two_errors() {
        let pairs = Pairs::new(&[(Err("clk fault"), Err("dt fault"))]);
        let encoder = driver(&pairs);
        let mut sub = encoder.subscribe().unwrap();
        let mut decoder = Decoder::new();

        encoder.sample(&mut decoder);

        assert_eq!(
            drain(&mut sub),
            [
                EncoderEvent::Error(PinReadError {
                    pin: CLK,
                    error: "clk fault",
                }),
                EncoderEvent::Error(PinReadError {
                    pin: DT,
                    error: "dt fault",
                }),
            ]
        );
    }

    #[test]
    fn position_wraps() {
        let pairs = Pairs::new(&levels(&[(0, 1)]));
        let encoder = driver(&pairs);
        encoder.position.lock(|position| position.set(i32::MAX));
        let mut decoder = Decoder::new();

        encoder.sample(&mut decoder);

        assert_eq!(encoder.position(), i32::MIN);
    }

    #[test]
    fn every_subscriber_sees_rotations() {
        let pairs = Pairs::new(&levels(&[(0, 0)]));
        let encoder = driver(&pairs);
        let mut first = encoder.subscribe().unwrap();
        let mut second = encoder.subscribe().unwrap();
        let mut decoder = Decoder::new();

        encoder.sample(&mut decoder);

        let expected = [EncoderEvent::Rotation {
            direction: Direction::CounterClockwise,
            position: -1,
        }];
        assert_eq!(drain(&mut first), expected);
        assert_eq!(drain(&mut second), expected);
    }

    #[test]
    fn subscriber_limit() {
        let pairs = Pairs::new(&[]);
        let encoder = driver(&pairs);
        let _subs: Vec<_> = (0..crate::MAX_SUBSCRIBERS)
            .map(|_| encoder.subscribe().unwrap())
            .collect();

        assert!(matches!(
            encoder.subscribe(),
            Err(PubSubError::MaximumSubscribersReached)
        ));
    }
}
