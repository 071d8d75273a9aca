//! Which PWM channel drives each joint of each leg, and the per-joint calibration offsets.
//!
//! The hexapod's six legs are wired as two groups of three, left and right, each with its own
//! channel numbering (one servo driver or one set of PWM outputs per side). Every joint also
//! carries a tick offset that corrects for how its servo horn was mounted.
//!
//! See [`HexapodConfig`] for the whole-robot configuration object.

use serde::{Deserialize, Serialize};

use crate::calibration::ServoCalibration;
use crate::pwm_channel::ChannelConfig;
use crate::{Error, Result};

/// Legs per side.
pub const LEG_COUNT: usize = 3;

/// Joints per leg, from the body outward.
pub const JOINT_COUNT: usize = 3;

/// Upper bound on the size of an encoded [`HexapodConfig`].
pub const ENCODED_LEN_MAX: usize = 96;

/// Side of the robot a leg belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub enum LegGroup {
    /// Left-hand legs.
    Left,
    /// Right-hand legs.
    Right,
}

/// The channel a joint is wired to and its installation offset.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub struct JointWiring {
    /// Channel index within the leg group.
    pub channel: u8,
    /// Signed correction, in calibration ticks, added to every pulse for this joint.
    pub offset_ticks: i16,
}

/// Channel and offset tables for the three legs of one side.
///
/// Rows are legs, columns are joints.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LegTopology {
    channels: [[u8; JOINT_COUNT]; LEG_COUNT],
    offset_ticks: [[i16; JOINT_COUNT]; LEG_COUNT],
}

impl LegTopology {
    /// Left-side wiring of the reference build.
    pub const LEFT: Self = Self::new(
        [[0, 2, 1], [7, 5, 10], [15, 12, 14]],
        [[-5, 10, 15], [-15, 15, -10], [20, 10, 0]],
    );

    /// Right-side wiring of the reference build.
    pub const RIGHT: Self = Self::new(
        [[15, 12, 14], [8, 9, 5], [0, 2, 1]],
        [[20, 0, 0], [-15, 0, -10], [-10, 0, -20]],
    );

    /// Create a topology from its channel and offset tables.
    #[must_use]
    pub const fn new(
        channels: [[u8; JOINT_COUNT]; LEG_COUNT],
        offset_ticks: [[i16; JOINT_COUNT]; LEG_COUNT],
    ) -> Self {
        Self {
            channels,
            offset_ticks,
        }
    }

    /// Wiring for one joint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] unless `leg < 3` and `joint < 3`.
    pub fn joint(&self, leg: usize, joint: usize) -> Result<JointWiring> {
        let channel = self
            .channels
            .get(leg)
            .and_then(|row| row.get(joint))
            .copied();
        let offset_ticks = self
            .offset_ticks
            .get(leg)
            .and_then(|row| row.get(joint))
            .copied();
        match (channel, offset_ticks) {
            (Some(channel), Some(offset_ticks)) => Ok(JointWiring {
                channel,
                offset_ticks,
            }),
            _ => Err(Error::IndexOutOfBounds { leg, joint }),
        }
    }

    /// Every joint as `(leg, joint, wiring)`, leg-major.
    pub fn joints(&self) -> impl Iterator<Item = (usize, usize, JointWiring)> + '_ {
        self.channels
            .iter()
            .zip(self.offset_ticks.iter())
            .enumerate()
            .flat_map(|(leg, (channels, offsets))| {
                channels
                    .iter()
                    .zip(offsets.iter())
                    .enumerate()
                    .map(move |(joint, (&channel, &offset_ticks))| {
                        (
                            leg,
                            joint,
                            JointWiring {
                                channel,
                                offset_ticks,
                            },
                        )
                    })
            })
    }
}

/// Calibration plus left and right wiring: everything a leg controller needs to set up its
/// PWM channels.
///
/// Passed explicitly to whatever assembles the channels; there is no global copy.
/// Swapping servo hardware means swapping the [`ServoCalibration`], not changing code.
///
/// # Example
///
/// ```rust
/// use hexapod_pwm::pwm_channel::ChannelConfig;
/// use hexapod_pwm::topology::{HexapodConfig, LegGroup};
///
/// let config = HexapodConfig::default();
/// let wiring = config.joint(LegGroup::Left, 1, 2)?;
/// assert_eq!(wiring.channel, 10);
///
/// let channel_config = config.channel_config(ChannelConfig::RP2040, LegGroup::Left, 1, 2)?;
/// assert_eq!(channel_config.tick_offset(), -10);
/// # Ok::<(), hexapod_pwm::Error>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct HexapodConfig {
    calibration: ServoCalibration,
    left: LegTopology,
    right: LegTopology,
}

impl HexapodConfig {
    /// Create a configuration.
    #[must_use]
    pub const fn new(calibration: ServoCalibration, left: LegTopology, right: LegTopology) -> Self {
        Self {
            calibration,
            left,
            right,
        }
    }

    /// Same wiring, different servo calibration.
    #[must_use]
    pub const fn with_calibration(mut self, calibration: ServoCalibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// Servo calibration shared by every joint.
    #[must_use]
    pub const fn calibration(&self) -> ServoCalibration {
        self.calibration
    }

    /// Wiring tables for one side.
    #[must_use]
    pub const fn topology(&self, group: LegGroup) -> &LegTopology {
        match group {
            LegGroup::Left => &self.left,
            LegGroup::Right => &self.right,
        }
    }

    /// Wiring for one joint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] unless `leg < 3` and `joint < 3`.
    pub fn joint(&self, group: LegGroup, leg: usize, joint: usize) -> Result<JointWiring> {
        self.topology(group).joint(leg, joint)
    }

    /// `base` with this configuration's calibration and the joint's tick offset applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] unless `leg < 3` and `joint < 3`.
    pub fn channel_config(
        &self,
        base: ChannelConfig,
        group: LegGroup,
        leg: usize,
        joint: usize,
    ) -> Result<ChannelConfig> {
        let wiring = self.joint(group, leg, joint)?;
        Ok(base
            .with_calibration(self.calibration)
            .with_tick_offset(wiring.offset_ticks))
    }

    /// Serialize with `postcard` into `buffer`, returning the used prefix.
    ///
    /// [`ENCODED_LEN_MAX`] bytes always suffice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormatError`] if `buffer` is too small.
    pub fn encode<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a mut [u8]> {
        postcard::to_slice(self, buffer).map_err(|_| Error::FormatError)
    }

    /// Deserialize from `postcard` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormatError`] if the bytes do not decode or the calibration is out of
    /// order.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| Error::FormatError)?;
        if !config.calibration.is_valid() {
            return Err(Error::FormatError);
        }
        Ok(config)
    }
}

impl Default for HexapodConfig {
    /// The reference build: servos behind PCA9685-style drivers, with its measured offsets.
    fn default() -> Self {
        Self::new(
            ServoCalibration::PCA9685,
            LegTopology::LEFT,
            LegTopology::RIGHT,
        )
    }
}
