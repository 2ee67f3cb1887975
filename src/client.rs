//! Host side dashboard for driving a sweep controller.
//!
//! Keeps a local mirror of what has been requested and turns key presses and
//! menu choices into protocol commands. It never reads the mirror back from
//! the controller.

use std::str::FromStr;
use thiserror::Error;

use crate::motion::{SWEEP_MAX, SWEEP_MIN};
use crate::protocol::Command;
use crate::state::{ServoId, DEFAULT_SPEED_DELAY_MS};

pub const SERVO_NUDGE_DEGREES: i32 = 5;
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
const SERVO_HOME: i32 = 90;
const PORT_KEYWORD: &str = "port";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedPreset {
    Fast,
    Medium,
    Slow,
}

impl SpeedPreset {
    pub fn delay_ms(self) -> i32 {
        match self {
            SpeedPreset::Fast => 15,
            SpeedPreset::Medium => 100,
            SpeedPreset::Slow => 333,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardKey {
    ToggleRunning,
    Servo1Forward,
    Servo1Backward,
    Servo2Forward,
    Servo2Backward,
    Speed(SpeedPreset),
    ToggleReverse,
    Menu,
    ChangePort(Option<String>),
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown key {0:?}")]
pub struct UnknownKey(pub String);

impl FromStr for DashboardKey {
    type Err = UnknownKey;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        if let Some((keyword, port)) = input.split_once(char::is_whitespace) {
            if keyword.eq_ignore_ascii_case(PORT_KEYWORD) {
                return Ok(DashboardKey::ChangePort(Some(port.trim().to_owned())));
            }
        }
        let key = match input.to_ascii_lowercase().as_str() {
            "space" | "s" => DashboardKey::ToggleRunning,
            "up" | "w" => DashboardKey::Servo1Forward,
            "down" | "x" => DashboardKey::Servo1Backward,
            "right" | "d" => DashboardKey::Servo2Forward,
            "left" | "a" => DashboardKey::Servo2Backward,
            "1" => DashboardKey::Speed(SpeedPreset::Fast),
            "2" => DashboardKey::Speed(SpeedPreset::Medium),
            "3" => DashboardKey::Speed(SpeedPreset::Slow),
            "r" => DashboardKey::ToggleReverse,
            "m" | "menu" => DashboardKey::Menu,
            PORT_KEYWORD => DashboardKey::ChangePort(None),
            "q" | "quit" => DashboardKey::Quit,
            _ => return Err(UnknownKey(input.to_owned())),
        };
        Ok(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    StartSweep,
    StopSweep,
    Speed(SpeedPreset),
    ToggleReverse,
    ChangePort,
    Back,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid choice! Please enter 1-8")]
pub struct InvalidChoice;

impl FromStr for MenuChoice {
    type Err = InvalidChoice;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let choice = match input.trim() {
            "1" => MenuChoice::StartSweep,
            "2" => MenuChoice::StopSweep,
            "3" => MenuChoice::Speed(SpeedPreset::Fast),
            "4" => MenuChoice::Speed(SpeedPreset::Medium),
            "5" => MenuChoice::Speed(SpeedPreset::Slow),
            "6" => MenuChoice::ToggleReverse,
            "7" => MenuChoice::ChangePort,
            "8" => MenuChoice::Back,
            _ => return Err(InvalidChoice),
        };
        Ok(choice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    pub connected: bool,
    pub running: bool,
    pub speed: i32,
    pub reverse_mode: bool,
    pub servo1: i32,
    pub servo2: i32,
}

impl DashboardState {
    pub fn new(connected: bool) -> DashboardState {
        DashboardState {
            connected,
            running: false,
            speed: DEFAULT_SPEED_DELAY_MS,
            reverse_mode: false,
            servo1: SERVO_HOME,
            servo2: SERVO_HOME,
        }
    }

    /// Update the mirror for `key` and return the command to send, if any.
    ///
    /// Quitting only sends `STOP` while connected. Menu and port keys are
    /// handled by the caller and send nothing.
    pub fn press(&mut self, key: &DashboardKey) -> Option<Command> {
        let command = match key {
            DashboardKey::ToggleRunning => {
                self.running = !self.running;
                if self.running {
                    Command::Start
                } else {
                    Command::Stop
                }
            }
            DashboardKey::Servo1Forward => self.nudge(ServoId::One, SERVO_NUDGE_DEGREES),
            DashboardKey::Servo1Backward => self.nudge(ServoId::One, -SERVO_NUDGE_DEGREES),
            DashboardKey::Servo2Forward => self.nudge(ServoId::Two, SERVO_NUDGE_DEGREES),
            DashboardKey::Servo2Backward => self.nudge(ServoId::Two, -SERVO_NUDGE_DEGREES),
            DashboardKey::Speed(preset) => self.set_speed(*preset),
            DashboardKey::ToggleReverse => self.toggle_reverse(),
            DashboardKey::Menu | DashboardKey::ChangePort(_) => return None,
            DashboardKey::Quit => {
                if !self.connected {
                    return None;
                }
                self.running = false;
                Command::Stop
            }
        };
        Some(command)
    }

    /// Menu entries set the running flag outright instead of toggling it.
    pub fn choose(&mut self, choice: MenuChoice) -> Option<Command> {
        let command = match choice {
            MenuChoice::StartSweep => {
                self.running = true;
                Command::Start
            }
            MenuChoice::StopSweep => {
                self.running = false;
                Command::Stop
            }
            MenuChoice::Speed(preset) => self.set_speed(preset),
            MenuChoice::ToggleReverse => self.toggle_reverse(),
            MenuChoice::ChangePort | MenuChoice::Back => return None,
        };
        Some(command)
    }

    fn set_speed(&mut self, preset: SpeedPreset) -> Command {
        self.speed = preset.delay_ms();
        Command::Speed(self.speed)
    }

    fn toggle_reverse(&mut self) -> Command {
        self.reverse_mode = !self.reverse_mode;
        Command::Reverse(self.reverse_mode)
    }

    fn nudge(&mut self, servo: ServoId, delta: i32) -> Command {
        let position = match servo {
            ServoId::One => &mut self.servo1,
            ServoId::Two => &mut self.servo2,
        };
        *position = (*position + delta).clamp(SWEEP_MIN, SWEEP_MAX);
        Command::Servo(servo, *position)
    }

    pub fn render(&self) -> String {
        let on_off = |flag: bool| if flag { "ON" } else { "OFF" };
        format!(
            "Status: {}\nConnection: {}\nSpeed Delay: {}ms\nReverse Mode: {}\n\
             Servo 1 Position: {} degrees\nServo 2 Position: {} degrees",
            if self.running { "RUNNING" } else { "STOPPED" },
            if self.connected { "Connected" } else { "Disconnected" },
            self.speed,
            on_off(self.reverse_mode),
            self.servo1,
            self.servo2,
        )
    }
}

/// Pick the port to connect to from a discovery list and what the user typed.
///
/// A valid 1-based index selects that port and any other number falls back
/// to the first one. Anything else picks the first port that `opens`, or the
/// first port when none do. With nothing discovered the entry itself is the
/// port name, defaulting to [`DEFAULT_PORT`].
pub fn choose_port(ports: &[String], entry: &str, opens: impl Fn(&str) -> bool) -> String {
    let entry = entry.trim();
    let first = match ports.first() {
        Some(first) => first,
        None if entry.is_empty() => return DEFAULT_PORT.to_owned(),
        None => return entry.to_owned(),
    };
    if !entry.is_empty() && entry.bytes().all(|b| b.is_ascii_digit()) {
        return entry
            .parse::<usize>()
            .ok()
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| ports.get(index))
            .unwrap_or(first)
            .clone();
    }
    ports
        .iter()
        .find(|port| opens(port.as_str()))
        .unwrap_or(first)
        .clone()
}

pub fn port_listing(ports: &[String], opens: impl Fn(&str) -> bool) -> String {
    ports
        .iter()
        .enumerate()
        .map(|(index, port)| {
            let status = if opens(port.as_str()) { "OK" } else { "?" };
            format!("  {}. {} [{}]", index + 1, port, status)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub const KEY_HELP: &str = "\
  s          Start/Stop auto sweep
  w / x      Servo 1 forward / backward (5 degrees)
  d / a      Servo 2 forward / backward (5 degrees)
  1          Fast speed (15ms)
  2          Medium speed (100ms)
  3          Slow speed (333ms)
  r          Toggle reverse mode
  m          Menu mode
  port NAME  Reconnect on another port
  q          Quit";

pub const MENU_HELP: &str = "\
  1. Start Sweep
  2. Stop Sweep
  3. Set Fast Speed (15ms)
  4. Set Medium Speed (100ms)
  5. Set Slow Speed (333ms)
  6. Toggle Reverse Mode
  7. Change Port
  8. Back to Control Mode";

#[cfg(test)]
mod tests {
    use super::*;

    fn ports(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn parse_keys() {
        assert_eq!("s".parse::<DashboardKey>(), Ok(DashboardKey::ToggleRunning));
        assert_eq!(" UP ".parse::<DashboardKey>(), Ok(DashboardKey::Servo1Forward));
        assert_eq!("3".parse::<DashboardKey>(), Ok(DashboardKey::Speed(SpeedPreset::Slow)));
        assert_eq!("M".parse::<DashboardKey>(), Ok(DashboardKey::Menu));
        assert_eq!("z".parse::<DashboardKey>(), Err(UnknownKey("z".to_owned())));
    }

    #[test]
    fn parse_port_key_keeps_name_case() {
        assert_eq!(
            "port /dev/ttyACM0".parse::<DashboardKey>(),
            Ok(DashboardKey::ChangePort(Some("/dev/ttyACM0".to_owned())))
        );
        assert_eq!(
            "PORT  /dev/cu.usbmodemB1 ".parse::<DashboardKey>(),
            Ok(DashboardKey::ChangePort(Some("/dev/cu.usbmodemB1".to_owned())))
        );
        assert_eq!("port".parse::<DashboardKey>(), Ok(DashboardKey::ChangePort(None)));
        assert!("ports x".parse::<DashboardKey>().is_err());
    }

    #[test]
    fn unknown_key_message() {
        assert_eq!(UnknownKey("z".to_owned()).to_string(), "unknown key \"z\"");
    }

    #[test]
    fn toggle_running_alternates() {
        let mut state = DashboardState::new(true);
        assert_eq!(state.press(&DashboardKey::ToggleRunning), Some(Command::Start));
        assert!(state.running);
        assert_eq!(state.press(&DashboardKey::ToggleRunning), Some(Command::Stop));
        assert!(!state.running);
    }

    #[test]
    fn nudges_are_clamped() {
        let mut state = DashboardState::new(true);
        assert_eq!(
            state.press(&DashboardKey::Servo1Forward),
            Some(Command::Servo(ServoId::One, 95))
        );
        for _ in 0..30 {
            state.press(&DashboardKey::Servo1Forward);
        }
        assert_eq!(state.servo1, 180);
        for _ in 0..40 {
            state.press(&DashboardKey::Servo2Backward);
        }
        assert_eq!(
            state.press(&DashboardKey::Servo2Backward),
            Some(Command::Servo(ServoId::Two, 0))
        );
    }

    #[test]
    fn speed_presets() {
        let mut state = DashboardState::new(true);
        assert_eq!(
            state.press(&DashboardKey::Speed(SpeedPreset::Medium)),
            Some(Command::Speed(100))
        );
        assert_eq!(state.speed, 100);
        assert_eq!(
            state.press(&DashboardKey::Speed(SpeedPreset::Slow)),
            Some(Command::Speed(333))
        );
    }

    #[test]
    fn reverse_toggle() {
        let mut state = DashboardState::new(true);
        assert_eq!(state.press(&DashboardKey::ToggleReverse), Some(Command::Reverse(true)));
        assert_eq!(state.press(&DashboardKey::ToggleReverse), Some(Command::Reverse(false)));
    }

    #[test]
    fn menu_and_port_keys_send_nothing() {
        let mut state = DashboardState::new(true);
        let before = state.clone();
        assert_eq!(state.press(&DashboardKey::Menu), None);
        assert_eq!(state.press(&DashboardKey::ChangePort(None)), None);
        assert_eq!(state, before);
    }

    #[test]
    fn quit_stops_only_when_connected() {
        let mut state = DashboardState::new(true);
        state.press(&DashboardKey::ToggleRunning);
        assert_eq!(state.press(&DashboardKey::Quit), Some(Command::Stop));
        assert!(!state.running);

        let mut offline = DashboardState::new(false);
        assert_eq!(offline.press(&DashboardKey::Quit), None);
    }

    #[test]
    fn parse_menu_choices() {
        assert_eq!("1".parse::<MenuChoice>(), Ok(MenuChoice::StartSweep));
        assert_eq!(" 4 ".parse::<MenuChoice>(), Ok(MenuChoice::Speed(SpeedPreset::Medium)));
        assert_eq!("7".parse::<MenuChoice>(), Ok(MenuChoice::ChangePort));
        assert_eq!("8".parse::<MenuChoice>(), Ok(MenuChoice::Back));
        assert_eq!("9".parse::<MenuChoice>(), Err(InvalidChoice));
        assert_eq!(InvalidChoice.to_string(), "Invalid choice! Please enter 1-8");
    }

    #[test]
    fn menu_start_and_stop_do_not_toggle() {
        let mut state = DashboardState::new(true);
        assert_eq!(state.choose(MenuChoice::StartSweep), Some(Command::Start));
        assert_eq!(state.choose(MenuChoice::StartSweep), Some(Command::Start));
        assert!(state.running);
        assert_eq!(state.choose(MenuChoice::StopSweep), Some(Command::Stop));
        assert!(!state.running);
    }

    #[test]
    fn menu_speed_and_reverse() {
        let mut state = DashboardState::new(true);
        assert_eq!(
            state.choose(MenuChoice::Speed(SpeedPreset::Slow)),
            Some(Command::Speed(333))
        );
        assert_eq!(state.choose(MenuChoice::ToggleReverse), Some(Command::Reverse(true)));
        assert!(state.reverse_mode);
        assert_eq!(state.choose(MenuChoice::ChangePort), None);
        assert_eq!(state.choose(MenuChoice::Back), None);
    }

    #[test]
    fn choose_port_by_index() {
        let found = ports(&["/dev/ttyACM0", "/dev/ttyUSB0"]);
        assert_eq!(choose_port(&found, "2", |_| false), "/dev/ttyUSB0");
        assert_eq!(choose_port(&found, "1", |_| false), "/dev/ttyACM0");
        assert_eq!(choose_port(&found, "7", |_| true), "/dev/ttyACM0");
        assert_eq!(choose_port(&found, "0", |_| true), "/dev/ttyACM0");
    }

    #[test]
    fn choose_port_auto_picks_first_that_opens() {
        let found = ports(&["/dev/ttyACM0", "/dev/ttyUSB0", "/dev/ttyUSB1"]);
        assert_eq!(
            choose_port(&found, "", |port| port.starts_with("/dev/ttyUSB")),
            "/dev/ttyUSB0"
        );
        assert_eq!(choose_port(&found, "auto", |_| false), "/dev/ttyACM0");
    }

    #[test]
    fn choose_port_manual_entry_without_discovery() {
        assert_eq!(choose_port(&[], "/dev/ttyAMA0", |_| false), "/dev/ttyAMA0");
        assert_eq!(choose_port(&[], "  ", |_| false), DEFAULT_PORT);
    }

    #[test]
    fn listing_marks_openable_ports() {
        let found = ports(&["/dev/ttyACM0", "/dev/ttyUSB0"]);
        assert_eq!(
            port_listing(&found, |port| port == "/dev/ttyUSB0"),
            "  1. /dev/ttyACM0 [?]\n  2. /dev/ttyUSB0 [OK]"
        );
    }

    #[test]
    fn render_summary() {
        let state = DashboardState::new(false);
        let text = state.render();
        assert!(text.contains("Status: STOPPED"));
        assert!(text.contains("Connection: Disconnected"));
        assert!(text.contains("Speed Delay: 15ms"));
        assert!(text.contains("Servo 1 Position: 90 degrees"));
    }
}
