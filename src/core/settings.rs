// Copyright @yucwang 2026

use crate::core::bvh::SplitMethod;
use crate::math::constants::Float;

use std::fmt;
use std::str::FromStr;

pub const DEFAULT_MAX_DEPTH: u32 = 64;
pub const DEFAULT_RUSSIAN_ROULETTE: Float = 0.8;

#[derive(Debug, PartialEq)]
pub enum SettingsError {
    UnknownFlag(String),
    MissingValue(&'static str),
    InvalidValue { flag: &'static str, value: String },
    OutOfRange { flag: &'static str, value: String },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::UnknownFlag(flag) => write!(f, "unknown flag: {}", flag),
            SettingsError::MissingValue(flag) => write!(f, "missing value for {}", flag),
            SettingsError::InvalidValue { flag, value } => write!(f, "invalid value for {}: {}", flag, value),
            SettingsError::OutOfRange { flag, value } => write!(f, "value out of range for {}: {}", flag, value),
        }
    }
}

impl std::error::Error for SettingsError {}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub width: usize,
    pub height: usize,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    pub russian_roulette: Float,
    pub seed: u64,
    pub split_method: SplitMethod,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 784,
            height: 784,
            samples_per_pixel: 16,
            max_depth: DEFAULT_MAX_DEPTH,
            russian_roulette: DEFAULT_RUSSIAN_ROULETTE,
            seed: 0,
            split_method: SplitMethod::Sah,
        }
    }
}

impl RenderSettings {
    pub fn usage(program: &str) -> String {
        format!("Usage: {} [--width N] [--height N] [--spp N] [--max-depth N] [--rr P] [--seed N] [--split naive|sah]",
                program)
    }

    /// Parses flags, not including the program name.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, SettingsError> {
        let mut settings = RenderSettings::default();

        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_ref();
            match flag {
                "--width" => settings.width = parse_value("--width", next_value(args, &mut i, "--width")?)?,
                "--height" => settings.height = parse_value("--height", next_value(args, &mut i, "--height")?)?,
                "--spp" => settings.samples_per_pixel = parse_value("--spp", next_value(args, &mut i, "--spp")?)?,
                "--max-depth" => settings.max_depth = parse_value("--max-depth", next_value(args, &mut i, "--max-depth")?)?,
                "--rr" => settings.russian_roulette = parse_value("--rr", next_value(args, &mut i, "--rr")?)?,
                "--seed" => settings.seed = parse_value("--seed", next_value(args, &mut i, "--seed")?)?,
                "--split" => {
                    settings.split_method = match next_value(args, &mut i, "--split")? {
                        "naive" => SplitMethod::Naive,
                        "sah" => SplitMethod::Sah,
                        other => return Err(SettingsError::InvalidValue {
                            flag: "--split",
                            value: other.to_string(),
                        }),
                    }
                }
                other => return Err(SettingsError::UnknownFlag(other.to_string())),
            }
            i += 1;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.width == 0 {
            return Err(out_of_range("--width", self.width));
        }
        if self.height == 0 {
            return Err(out_of_range("--height", self.height));
        }
        if self.samples_per_pixel == 0 {
            return Err(out_of_range("--spp", self.samples_per_pixel));
        }
        if !(self.russian_roulette > 0.0 && self.russian_roulette <= 1.0) {
            return Err(out_of_range("--rr", self.russian_roulette));
        }
        Ok(())
    }
}

fn next_value<'a, S: AsRef<str>>(args: &'a [S], i: &mut usize, flag: &'static str) -> Result<&'a str, SettingsError> {
    *i += 1;
    args.get(*i).map(|v| v.as_ref()).ok_or(SettingsError::MissingValue(flag))
}

fn parse_value<T: FromStr>(flag: &'static str, value: &str) -> Result<T, SettingsError> {
    value.parse::<T>().map_err(|_| SettingsError::InvalidValue {
        flag,
        value: value.to_string(),
    })
}

fn out_of_range<T: ToString>(flag: &'static str, value: T) -> SettingsError {
    SettingsError::OutOfRange { flag, value: value.to_string() }
}
