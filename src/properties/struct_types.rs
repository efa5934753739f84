//! Fixed-shape struct bodies GVAS recognizes by name (spec §4.C "Known
//! fixed-field structs"): these never carry a nested property list, only a
//! hardcoded sequence of primitive fields.

use std::fmt::Display;

/// A 3D vector. Single precision unless the save was written by a UE5
/// engine with large world coordinates enabled, in which case each
/// component is a double (spec §4.C "large_world_coordinates").
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vector {
    /// Creates a new vector.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vector { x, y, z }
    }
}

impl Display for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "X={}, Y={}, Z={}", self.x, self.y, self.z)
    }
}

/// A pitch/yaw/roll rotation, same precision rule as [`Vector`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rotator {
    /// Pitch component.
    pub pitch: f64,
    /// Yaw component.
    pub yaw: f64,
    /// Roll component.
    pub roll: f64,
}

impl Rotator {
    /// Creates a new rotator.
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Rotator { pitch, yaw, roll }
    }
}

impl Display for Rotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Pitch={}, Yaw={}, Roll={}", self.pitch, self.yaw, self.roll)
    }
}

/// A quaternion, same precision rule as [`Vector`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quat {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
    /// W component.
    pub w: f64,
}

impl Quat {
    /// Creates a new quaternion.
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Quat { x, y, z, w }
    }
}

impl Display for Quat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "X={}, Y={}, Z={}, W={}", self.x, self.y, self.z, self.w)
    }
}

/// An RGBA color stored as four floats (spec §4.C adds this over the
/// teacher's struct catalog).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearColor {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl LinearColor {
    /// Creates a new color.
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        LinearColor { r, g, b, a }
    }
}

impl Display for LinearColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R={}, G={}, B={}, A={}", self.r, self.g, self.b, self.a)
    }
}

/// A tick count, the wire shape of `FDateTime` (100ns ticks since 0001-01-01).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateTime {
    /// Ticks since the Unreal epoch.
    pub ticks: u64,
}

impl DateTime {
    /// Creates a new `DateTime` from a raw tick count.
    pub fn new(ticks: u64) -> Self {
        DateTime { ticks }
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ticks)
    }
}

/// An integer 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntPoint {
    /// X component.
    pub x: i32,
    /// Y component.
    pub y: i32,
}

impl IntPoint {
    /// Creates a new point.
    pub fn new(x: i32, y: i32) -> Self {
        IntPoint { x, y }
    }
}

impl Display for IntPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "X={}, Y={}", self.x, self.y)
    }
}
