//! Line protocol spoken between the controller and whoever drives it.
//!
//! Inbound lines are parsed into [`Command`]s, outbound acknowledgments are
//! [`StatusLine`]s. Both render to their wire text through `Display`.

use std::fmt;

use crate::state::ServoId;

const START: &str = "START";
const STOP: &str = "STOP";
const SPEED_PREFIX: &str = "SPEED:";
const SERVO1_PREFIX: &str = "SERVO1:";
const SERVO2_PREFIX: &str = "SERVO2:";
const REVERSE_PREFIX: &str = "REVERSE:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Speed(i32),
    /// Move one servo directly. The angle is not clamped.
    Servo(ServoId, i32),
    Reverse(bool),
}

/// Parse one line of input.
///
/// Matching is case sensitive and happens after trimming surrounding
/// whitespace. Unknown input yields `None`, as does a `REVERSE:` whose value
/// is neither 0 nor 1.
pub fn parse(line: &str) -> Option<Command> {
    let line = line.trim();
    if line == START {
        return Some(Command::Start);
    }
    if line == STOP {
        return Some(Command::Stop);
    }
    if let Some(rest) = line.strip_prefix(SPEED_PREFIX) {
        return Some(Command::Speed(parse_int(rest)));
    }
    if let Some(rest) = line.strip_prefix(SERVO1_PREFIX) {
        return Some(Command::Servo(ServoId::One, parse_int(rest)));
    }
    if let Some(rest) = line.strip_prefix(SERVO2_PREFIX) {
        return Some(Command::Servo(ServoId::Two, parse_int(rest)));
    }
    if let Some(rest) = line.strip_prefix(REVERSE_PREFIX) {
        return match parse_int(rest) {
            0 => Some(Command::Reverse(false)),
            1 => Some(Command::Reverse(true)),
            _ => None,
        };
    }
    None
}

/// Best effort decimal parse.
///
/// Skips leading whitespace, accepts one optional sign and then as many
/// digits as follow. Anything after the digits is ignored. Input without
/// digits is 0 and values outside `i32` saturate.
pub fn parse_int(input: &str) -> i32 {
    let input = input.trim_start();
    let (negative, digits) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };
    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = (value * 10 + (b - b'0') as i64).min(i32::MAX as i64 + 1);
    }
    if negative {
        value = -value;
    }
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Command::Start => write!(f, "{}", START),
            Command::Stop => write!(f, "{}", STOP),
            Command::Speed(delay) => write!(f, "{}{}", SPEED_PREFIX, delay),
            Command::Servo(ServoId::One, angle) => write!(f, "{}{}", SERVO1_PREFIX, angle),
            Command::Servo(ServoId::Two, angle) => write!(f, "{}{}", SERVO2_PREFIX, angle),
            Command::Reverse(on) => write!(f, "{}{}", REVERSE_PREFIX, *on as u8),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLine {
    Started,
    Stopped,
    SpeedSet(i32),
    ServoMoved(ServoId, i32),
    ReverseOn,
    ReverseOff,
    ReverseTimeout,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StatusLine::Started => write!(f, "Started"),
            StatusLine::Stopped => write!(f, "Stopped"),
            StatusLine::SpeedSet(delay) => write!(f, "Speed set to: {}", delay),
            StatusLine::ServoMoved(servo, angle) => write!(f, "{}: {}", servo, angle),
            StatusLine::ReverseOn => write!(f, "Reverse mode ON"),
            StatusLine::ReverseOff => write!(f, "Reverse mode OFF"),
            StatusLine::ReverseTimeout => write!(f, "Reverse mode timeout - back to normal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_commands() {
        assert_eq!(parse("START"), Some(Command::Start));
        assert_eq!(parse("STOP"), Some(Command::Stop));
        assert_eq!(parse("  START \r"), Some(Command::Start));
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(parse("start"), None);
        assert_eq!(parse("Speed:5"), None);
        assert_eq!(parse("STARTED"), None);
    }

    #[test]
    fn parse_parameter_commands() {
        assert_eq!(parse("SPEED:5"), Some(Command::Speed(5)));
        assert_eq!(parse("SERVO1:45"), Some(Command::Servo(ServoId::One, 45)));
        assert_eq!(parse("SERVO2:170\n"), Some(Command::Servo(ServoId::Two, 170)));
        assert_eq!(parse("REVERSE:1"), Some(Command::Reverse(true)));
        assert_eq!(parse("REVERSE:0"), Some(Command::Reverse(false)));
    }

    #[test]
    fn parse_non_numeric_is_zero() {
        assert_eq!(parse("SPEED:abc"), Some(Command::Speed(0)));
        assert_eq!(parse("SPEED:"), Some(Command::Speed(0)));
        assert_eq!(parse("SERVO1:x90"), Some(Command::Servo(ServoId::One, 0)));
        // a junk reverse value reads as 0 and so turns reverse mode off
        assert_eq!(parse("REVERSE:on"), Some(Command::Reverse(false)));
    }

    #[test]
    fn parse_out_of_range_values_verbatim() {
        assert_eq!(parse("SERVO1:270"), Some(Command::Servo(ServoId::One, 270)));
        assert_eq!(parse("SERVO2:-15"), Some(Command::Servo(ServoId::Two, -15)));
        assert_eq!(parse("SPEED:-3"), Some(Command::Speed(-3)));
    }

    #[test]
    fn parse_unknown_reverse_value() {
        assert_eq!(parse("REVERSE:2"), None);
        assert_eq!(parse("REVERSE:-1"), None);
    }

    #[test]
    fn parse_unknown() {
        assert_eq!(parse("FOO:1"), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse("SERVO3:10"), None);
    }

    #[test]
    fn parse_int_prefix_digits() {
        assert_eq!(parse_int("42"), 42);
        assert_eq!(parse_int("  42"), 42);
        assert_eq!(parse_int("42abc"), 42);
        assert_eq!(parse_int("+7"), 7);
        assert_eq!(parse_int("-7ms"), -7);
        assert_eq!(parse_int("-"), 0);
        assert_eq!(parse_int("1.5"), 1);
    }

    #[test]
    fn parse_int_saturates() {
        assert_eq!(parse_int("99999999999"), i32::MAX);
        assert_eq!(parse_int("-99999999999"), i32::MIN);
        assert_eq!(parse_int("-2147483648"), i32::MIN);
    }

    #[test]
    fn command_wire_text() {
        assert_eq!(Command::Start.to_string(), "START");
        assert_eq!(Command::Speed(333).to_string(), "SPEED:333");
        assert_eq!(Command::Servo(ServoId::Two, 95).to_string(), "SERVO2:95");
        assert_eq!(Command::Reverse(true).to_string(), "REVERSE:1");
        assert_eq!(Command::Reverse(false).to_string(), "REVERSE:0");
    }

    #[test]
    fn status_line_text() {
        assert_eq!(StatusLine::SpeedSet(5).to_string(), "Speed set to: 5");
        assert_eq!(StatusLine::ServoMoved(ServoId::One, -4).to_string(), "Servo1: -4");
        assert_eq!(
            StatusLine::ReverseTimeout.to_string(),
            "Reverse mode timeout - back to normal"
        );
    }
}
