//! Line commands accepted on the `paddled run` console

use std::str::FromStr;

use paddle_calibration::CalibrationRange;

use crate::error::BridgeError;

pub const HELP: &str = "\
commands:
  calibrate | cal [ms]        capture min/max for ms (default from config)
  stop                        end the capture and commit it
  reset                       restore the identity mapping
  set LMIN LMAX RMIN RMAX     apply a calibration range
  show                        print the calibration range
  stats                       print packet statistics
  help | ?                    show this help
  quit | exit                 stop the bridge";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Calibrate(Option<u64>),
    Stop,
    Reset,
    Set(CalibrationRange),
    Show,
    Stats,
    Help,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = BridgeError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words
            .next()
            .ok_or(BridgeError::InvalidArgument("empty command"))?;

        let parsed = match command.to_ascii_lowercase().as_str() {
            "calibrate" | "cal" => {
                let duration = words
                    .next()
                    .map(|w| {
                        w.parse::<u64>()
                            .map_err(|_| BridgeError::InvalidArgument("duration must be milliseconds"))
                    })
                    .transpose()?;
                ConsoleCommand::Calibrate(duration)
            }
            "stop" => ConsoleCommand::Stop,
            "reset" => ConsoleCommand::Reset,
            "set" => {
                let mut value = || -> Result<u16, BridgeError> {
                    words
                        .next()
                        .ok_or(BridgeError::InvalidArgument("set needs four values"))?
                        .parse::<u16>()
                        .map_err(|_| BridgeError::InvalidArgument("range values must be 0-65535"))
                };
                let (left_min, left_max) = (value()?, value()?);
                let (right_min, right_max) = (value()?, value()?);
                ConsoleCommand::Set(CalibrationRange::new(left_min, left_max, right_min, right_max))
            }
            "show" => ConsoleCommand::Show,
            "stats" => ConsoleCommand::Stats,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            _ => return Err(BridgeError::InvalidArgument("unknown command")),
        };

        if words.next().is_some() {
            return Err(BridgeError::InvalidArgument("too many arguments"));
        }
        Ok(parsed)
    }
}
