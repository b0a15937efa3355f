use std::{num::NonZeroUsize, path::PathBuf, sync::OnceLock, time::Duration};

use clap::Parser;

use crate::discovery::DiscoverySettings;

/// Write running Docker containers to a file for file-based service discovery.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// File to write targets to.
    #[arg(short, long, env = "DOCKER_FILE_SD_FILE", default_value = "targets.json")]
    pub file: PathBuf,

    /// Interval to refresh targets at (e.g. `30s`, `1m30s`).
    #[arg(
        short,
        long,
        env = "DOCKER_FILE_SD_INTERVAL",
        default_value = "30s",
        value_parser = parse_interval
    )]
    pub interval: Duration,

    /// Maximum number of containers inspected at the same time. Unbounded by default.
    #[arg(long, env = "DOCKER_FILE_SD_MAX_CONCURRENT_INSPECTIONS")]
    pub max_concurrent_inspections: Option<NonZeroUsize>,

    /// Give up on a single container inspection after this long. No limit by default.
    #[arg(long, env = "DOCKER_FILE_SD_INSPECT_TIMEOUT", value_parser = parse_interval)]
    pub inspect_timeout: Option<Duration>,
}

impl Args {
    pub fn discovery_settings(&self) -> DiscoverySettings {
        DiscoverySettings {
            file: self.file.clone(),
            interval: self.interval,
            max_concurrent_inspections: self.max_concurrent_inspections,
            inspect_timeout: self.inspect_timeout,
        }
    }
}

static ARGS: OnceLock<Args> = OnceLock::new();

pub fn get_cli_args() -> &'static Args {
    ARGS.get_or_init(Args::parse)
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("empty duration")]
    Empty,
    #[error("invalid duration `{0}`")]
    Invalid(String),
    #[error("missing unit in duration `{0}`")]
    MissingUnit(String),
    #[error("unknown unit `{unit}` in duration `{input}`")]
    UnknownUnit { unit: String, input: String },
    #[error("duration `{0}` is out of range")]
    Overflow(String),
    #[error("duration must be greater than zero")]
    Zero,
}

/// Parse a duration such as `300ms`, `1.5h` or `2h45m`.
///
/// Accepted units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare `0`
/// is allowed, any other number needs a unit.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DurationParseError::Empty);
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total: f64 = 0.0;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        if number.is_empty() || number == "." {
            return Err(DurationParseError::Invalid(input.to_string()));
        }
        let value: f64 = number
            .parse()
            .map_err(|_| DurationParseError::Invalid(input.to_string()))?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let nanos_per_unit = match unit {
            "" => return Err(DurationParseError::MissingUnit(input.to_string())),
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => {
                return Err(DurationParseError::UnknownUnit {
                    unit: unit.to_string(),
                    input: input.to_string(),
                });
            }
        };

        total += value * nanos_per_unit;
        rest = tail;
    }

    if !total.is_finite() || total > u64::MAX as f64 {
        return Err(DurationParseError::Overflow(input.to_string()));
    }
    Ok(Duration::from_nanos(total.round() as u64))
}

/// Like [`parse_duration`], rejecting zero.
pub fn parse_interval(input: &str) -> Result<Duration, DurationParseError> {
    let duration = parse_duration(input)?;
    if duration.is_zero() {
        return Err(DurationParseError::Zero);
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["docker-file-sd"]).unwrap();
        assert_eq!(args.file, PathBuf::from("targets.json"));
        assert_eq!(args.interval, Duration::from_secs(30));
        assert_eq!(args.max_concurrent_inspections, None);
        assert_eq!(args.inspect_timeout, None);
        assert_eq!(args.discovery_settings(), DiscoverySettings::default());
    }

    #[test]
    fn test_short_flags() {
        let args =
            Args::try_parse_from(["docker-file-sd", "-f", "/etc/prometheus/docker.json", "-i", "1m"])
                .unwrap();
        assert_eq!(args.file, PathBuf::from("/etc/prometheus/docker.json"));
        assert_eq!(args.interval, Duration::from_secs(60));
    }

    #[test]
    fn test_hardening_flags() {
        let args = Args::try_parse_from([
            "docker-file-sd",
            "--max-concurrent-inspections",
            "8",
            "--inspect-timeout",
            "2s",
        ])
        .unwrap();
        let settings = args.discovery_settings();
        assert_eq!(settings.max_concurrent_inspections, NonZeroUsize::new(8));
        assert_eq!(settings.inspect_timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(Args::try_parse_from(["docker-file-sd", "-i", "0s"]).is_err());
        assert!(Args::try_parse_from(["docker-file-sd", "--max-concurrent-inspections", "0"]).is_err());
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("300ms"), Ok(Duration::from_millis(300)));
        assert_eq!(parse_duration("1m30s"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_duration("2h45m"), Ok(Duration::from_secs(9900)));
        assert_eq!(parse_duration("1.5h"), Ok(Duration::from_secs(5400)));
        assert_eq!(parse_duration("10us"), Ok(Duration::from_micros(10)));
        assert_eq!(parse_duration("10µs"), Ok(Duration::from_micros(10)));
        assert_eq!(parse_duration("42ns"), Ok(Duration::from_nanos(42)));
        assert_eq!(parse_duration(" 5s "), Ok(Duration::from_secs(5)));
        assert_eq!(parse_duration("0"), Ok(Duration::ZERO));
    }

    #[test]
    fn test_parse_duration_errors() {
        assert_eq!(parse_duration(""), Err(DurationParseError::Empty));
        assert_eq!(
            parse_duration("30"),
            Err(DurationParseError::MissingUnit("30".to_string()))
        );
        assert_eq!(
            parse_duration("5d"),
            Err(DurationParseError::UnknownUnit {
                unit: "d".to_string(),
                input: "5d".to_string()
            })
        );
        assert_eq!(
            parse_duration("s"),
            Err(DurationParseError::Invalid("s".to_string()))
        );
        assert_eq!(
            parse_duration("-5s"),
            Err(DurationParseError::Invalid("-5s".to_string()))
        );
        assert_eq!(
            parse_duration("1..5s"),
            Err(DurationParseError::Invalid("1..5s".to_string()))
        );
        assert_eq!(parse_interval("0"), Err(DurationParseError::Zero));
    }
}
