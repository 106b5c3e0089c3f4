//! Fan report
//!
//! Per-fan speeds and mode decoded from the well-known fan keys.
//!
//! ## Keys
//! - `FNum`: number of fans
//! - `F<n>Ac`, `F<n>Mn`, `F<n>Mx`, `F<n>Sf`, `F<n>Tg`: actual, minimum,
//!   maximum, safe and target speed of fan `n` (`fpe2`)
//! - `FS! `: forced-mode bitmask, bit `n` set = fan `n` forced
//!
//! The key names hold a single decimal digit, so only fans 0–9 are
//! addressable.

use std::fmt;

use crate::client::SmcClient;
use crate::error::{Result, SmcError};
use crate::protocol::{decode_fixed_point, decode_unsigned, Key, FPE2_FRACTION_BITS};
use crate::transport::SmcTransport;

/// Highest fan count the key names can address
pub const MAX_ADDRESSABLE_FANS: u64 = 10;

/// Fan control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanMode {
    #[default]
    Auto,
    Forced,
}

impl FanMode {
    /// Mode of fan `index` in the `FS! ` bitmask
    pub fn from_mask(mask: u16, index: u8) -> Self {
        if u32::from(mask) & (1u32 << index) == 0 {
            FanMode::Auto
        } else {
            FanMode::Forced
        }
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FanMode::Auto => write!(f, "auto"),
            FanMode::Forced => write!(f, "forced"),
        }
    }
}

/// A per-fan reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanAttribute {
    Actual,
    Minimum,
    Maximum,
    Safe,
    Target,
    Mode,
}

impl FanAttribute {
    /// Speed attributes in report order
    pub const SPEEDS: [FanAttribute; 5] = [
        FanAttribute::Actual,
        FanAttribute::Minimum,
        FanAttribute::Maximum,
        FanAttribute::Safe,
        FanAttribute::Target,
    ];

    /// Two-letter key suffix; `None` for the mode, which has its own key
    pub fn suffix(&self) -> Option<&'static [u8; 2]> {
        match self {
            FanAttribute::Actual => Some(b"Ac"),
            FanAttribute::Minimum => Some(b"Mn"),
            FanAttribute::Maximum => Some(b"Mx"),
            FanAttribute::Safe => Some(b"Sf"),
            FanAttribute::Target => Some(b"Tg"),
            FanAttribute::Mode => None,
        }
    }
}

/// Key of a fan attribute, e.g. `F0Ac`
///
/// `None` when the index needs more than one digit or the attribute has no
/// per-fan key.
pub fn fan_key(index: u8, attribute: FanAttribute) -> Option<Key> {
    if u64::from(index) >= MAX_ADDRESSABLE_FANS {
        return None;
    }
    let suffix = attribute.suffix()?;
    Some(Key::from_bytes([b'F', b'0' + index, suffix[0], suffix[1]]))
}

/// Decoded state of one fan
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FanInfo {
    pub index: u8,
    pub actual: u64,
    pub minimum: u64,
    pub maximum: u64,
    pub safe: u64,
    pub target: u64,
    pub mode: FanMode,
}

impl FanInfo {
    fn set(&mut self, attribute: FanAttribute, speed: u64) {
        match attribute {
            FanAttribute::Actual => self.actual = speed,
            FanAttribute::Minimum => self.minimum = speed,
            FanAttribute::Maximum => self.maximum = speed,
            FanAttribute::Safe => self.safe = speed,
            FanAttribute::Target => self.target = speed,
            FanAttribute::Mode => {}
        }
    }
}

/// A fan attribute that could not be read
#[derive(Debug)]
pub struct FanIssue {
    /// Fan index; `None` for the shared mode key
    pub fan: Option<u8>,
    pub attribute: FanAttribute,
    pub error: SmcError,
}

/// Fan report
#[derive(Debug, Default)]
pub struct FanReport {
    /// Fan count reported by `FNum`
    pub total: u64,

    /// Decoded fans; attributes that failed to read are left at zero
    pub fans: Vec<FanInfo>,

    /// Attribute reads that failed
    pub issues: Vec<FanIssue>,
}

impl fmt::Display for FanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total fans in system: {}", self.total)?;

        for fan in &self.fans {
            writeln!(f)?;
            writeln!(f, "Fan #{}:", fan.index)?;
            match fan_key(fan.index, FanAttribute::Actual) {
                Some(key) => writeln!(f, "    Actual speed : {} Key[{}]", fan.actual, key)?,
                None => writeln!(f, "    Actual speed : {}", fan.actual)?,
            }
            writeln!(f, "    Minimum speed: {}", fan.minimum)?;
            writeln!(f, "    Maximum speed: {}", fan.maximum)?;
            writeln!(f, "    Safe speed   : {}", fan.safe)?;
            writeln!(f, "    Target speed : {}", fan.target)?;
            writeln!(f, "    Mode         : {}", fan.mode)?;
        }

        Ok(())
    }
}

impl<T: SmcTransport> SmcClient<T> {
    /// Read the fan report
    ///
    /// Fails only if `FNum` cannot be read. Any other failed read leaves the
    /// attribute at its default and is recorded in [`FanReport::issues`].
    pub fn fan_report(&mut self) -> Result<FanReport> {
        let count = self.read_key(Key::FAN_COUNT)?;
        let total = decode_unsigned(&count.bytes, count.size);

        let mut report = FanReport {
            total,
            ..FanReport::default()
        };

        if total > MAX_ADDRESSABLE_FANS {
            tracing::warn!(
                "{} fans reported; only the first {} are addressable",
                total,
                MAX_ADDRESSABLE_FANS
            );
        }
        let addressable = total.min(MAX_ADDRESSABLE_FANS) as u8;
        if addressable == 0 {
            return Ok(report);
        }

        let mask = match self.read_key(Key::FAN_MODE) {
            Ok(value) => decode_unsigned(&value.bytes, 2) as u16,
            Err(error) => {
                tracing::warn!("Failed to read fan mode key: {}", error);
                report.issues.push(FanIssue {
                    fan: None,
                    attribute: FanAttribute::Mode,
                    error,
                });
                0
            }
        };

        for index in 0..addressable {
            let mut fan = FanInfo {
                index,
                mode: FanMode::from_mask(mask, index),
                ..FanInfo::default()
            };

            for attribute in FanAttribute::SPEEDS {
                let Some(key) = fan_key(index, attribute) else {
                    continue;
                };

                match self.read_key(key) {
                    Ok(value) => fan.set(
                        attribute,
                        decode_fixed_point(&value.bytes, value.size, FPE2_FRACTION_BITS),
                    ),
                    Err(error) => {
                        tracing::warn!("Failed to read {}: {}", key, error);
                        report.issues.push(FanIssue {
                            fan: Some(index),
                            attribute,
                            error,
                        });
                    }
                }
            }

            report.fans.push(fan);
        }

        Ok(report)
    }
}
