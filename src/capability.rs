//! Generic pin capabilities
//!
//! Minimal interfaces any GPIO driver can implement. [`Pin`](crate::Pin)
//! implements both through direct register access.

use std::fmt;
use std::str::FromStr;

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

/// Logic level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Low => write!(f, "low"),
            Level::High => write!(f, "high"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in" | "input" => Ok(Direction::In),
            "out" | "output" => Ok(Direction::Out),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" | "1" | "on" => Ok(Level::High),
            "low" | "0" | "off" => Ok(Level::Low),
            other => Err(format!("unknown level: {}", other)),
        }
    }
}

/// Digital I/O on a single pin
pub trait DigitalPin {
    type Error;

    fn set_direction(&self, direction: Direction) -> Result<(), Self::Error>;
    fn set_value(&self, value: Level) -> Result<(), Self::Error>;
    fn value(&self) -> Result<Level, Self::Error>;
}

/// Internal pull resistor control
pub trait Puller {
    type Error;

    fn pull_up(&self) -> Result<(), Self::Error>;
    fn pull_down(&self) -> Result<(), Self::Error>;
    fn stop_pulling(&self) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direction() {
        assert_eq!("OUT".parse::<Direction>(), Ok(Direction::Out));
        assert_eq!("input".parse::<Direction>(), Ok(Direction::In));
        assert!("alt0".parse::<Direction>().is_err());
    }

    #[test]
    fn test_parse_level() {
        assert_eq!("1".parse::<Level>(), Ok(Level::High));
        assert_eq!("Low".parse::<Level>(), Ok(Level::Low));
        assert_eq!(Level::from(true), Level::High);
        assert_eq!(Level::High.to_string(), "high");
    }
}
