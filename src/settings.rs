use log::{info, warn};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::{LazyLock, Mutex};

const SETTINGS_PATH: &str = "tapsync.ini";

/// Offset adjustment steps, stored rounded to the millisecond.
pub const OFFSET_STEP_FINE_S: f32 = 0.001;
pub const OFFSET_STEP_COARSE_S: f32 = 0.01;
/// Green-number adjustment steps and bounds.
pub const SPEED_STEP_FINE: i32 = 10;
pub const SPEED_STEP_COARSE: i32 = 100;
pub const SPEED_MIN: u32 = 100;
pub const SPEED_MAX: u32 = 2000;

// --- Minimal INI reader ---
#[derive(Debug, Default)]
struct SimpleIni {
    sections: HashMap<String, HashMap<String, String>>,
}

impl SimpleIni {
    fn load(path: &str) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        let mut ini = Self::default();
        ini.parse_str(&content);
        Ok(ini)
    }

    fn parse_str(&mut self, content: &str) {
        let mut current_section: Option<String> = None;

        for raw_line in content.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            // Section header: [SectionName]
            if line.starts_with('[') && line.ends_with(']') && line.len() >= 2 {
                let name = line[1..line.len() - 1].trim().to_string();
                current_section = Some(name.clone());
                self.sections.entry(name).or_default();
                continue;
            }

            // Key/value pair: key=value
            if let Some(eq_idx) = line.find('=') {
                let (key_raw, value_raw) = line.split_at(eq_idx);
                let key = key_raw.trim();
                if key.is_empty() {
                    continue;
                }
                let value = value_raw[1..].trim().to_string();
                let section = current_section.clone().unwrap_or_default();
                self.sections
                    .entry(section)
                    .or_default()
                    .insert(key.to_string(), value);
            }
        }
    }

    fn get(&self, section: &str, key: &str) -> Option<String> {
        self.sections.get(section).and_then(|s| s.get(key)).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Error => "Error",
            Self::Warn => "Warn",
            Self::Info => "Info",
            Self::Debug => "Debug",
            Self::Trace => "Trace",
        }
    }

    pub const fn as_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Off => log::LevelFilter::Off,
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub global_offset_seconds: f32,
    pub scroll_speed_4k: u32,
    pub scroll_speed_7k: u32,
    pub lane_count: u8,
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            global_offset_seconds: 0.0,
            scroll_speed_4k: 500,
            scroll_speed_7k: 800,
            lane_count: 4,
            log_level: LogLevel::Info,
        }
    }
}

impl Settings {
    /// Green number for the given lane mode.
    pub fn scroll_speed_for(&self, lane_count: u8) -> u32 {
        if lane_count == 7 {
            self.scroll_speed_7k
        } else {
            self.scroll_speed_4k
        }
    }
}

// Global, mutable settings instance.
static SETTINGS: LazyLock<Mutex<Settings>> = LazyLock::new(|| Mutex::new(Settings::default()));

/// An offset nudged by one step, kept on the millisecond grid.
#[inline(always)]
pub fn stepped_offset(current_s: f32, step_s: f32) -> f32 {
    ((current_s + step_s) * 1000.0).round() / 1000.0
}

#[inline(always)]
fn clamped_speed(value: i64) -> u32 {
    value.clamp(i64::from(SPEED_MIN), i64::from(SPEED_MAX)) as u32
}

fn create_default_settings_file() -> Result<(), std::io::Error> {
    info!("'{SETTINGS_PATH}' not found, creating with default values.");
    let default = Settings::default();

    let mut content = String::new();

    // [Options] section - keys in alphabetical order
    content.push_str("[Options]\n");
    content.push_str(&format!(
        "GlobalOffsetSeconds={}\n",
        default.global_offset_seconds
    ));
    content.push_str(&format!("LaneCount={}\n", default.lane_count));
    content.push_str(&format!("LogLevel={}\n", default.log_level.as_str()));
    content.push_str(&format!("ScrollSpeed4K={}\n", default.scroll_speed_4k));
    content.push_str(&format!("ScrollSpeed7K={}\n", default.scroll_speed_7k));
    content.push('\n');

    std::fs::write(SETTINGS_PATH, content)
}

pub fn load() {
    if !Path::new(SETTINGS_PATH).exists()
        && let Err(e) = create_default_settings_file()
    {
        warn!("Failed to create default settings file: {e}");
    }

    match SimpleIni::load(SETTINGS_PATH) {
        Ok(conf) => {
            let mut settings = SETTINGS.lock().unwrap();
            let default = Settings::default();

            settings.global_offset_seconds = conf
                .get("Options", "GlobalOffsetSeconds")
                .and_then(|v| v.parse::<f32>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(default.global_offset_seconds);
            settings.lane_count = conf
                .get("Options", "LaneCount")
                .and_then(|v| v.parse::<u8>().ok())
                .map_or(default.lane_count, |v| if v == 7 { 7 } else { 4 });
            settings.log_level = conf
                .get("Options", "LogLevel")
                .and_then(|v| LogLevel::from_str(&v).ok())
                .unwrap_or(default.log_level);
            settings.scroll_speed_4k = conf
                .get("Options", "ScrollSpeed4K")
                .and_then(|v| v.parse::<i64>().ok())
                .map_or(default.scroll_speed_4k, clamped_speed);
            settings.scroll_speed_7k = conf
                .get("Options", "ScrollSpeed7K")
                .and_then(|v| v.parse::<i64>().ok())
                .map_or(default.scroll_speed_7k, clamped_speed);
        }
        Err(e) => {
            warn!("Failed to read '{SETTINGS_PATH}': {e}; using defaults.");
        }
    }
}

fn save() {
    let settings = SETTINGS.lock().unwrap();

    let mut content = String::new();

    // [Options] (alphabetical order)
    content.push_str("[Options]\n");
    content.push_str(&format!(
        "GlobalOffsetSeconds={}\n",
        settings.global_offset_seconds
    ));
    content.push_str(&format!("LaneCount={}\n", settings.lane_count));
    content.push_str(&format!("LogLevel={}\n", settings.log_level.as_str()));
    content.push_str(&format!("ScrollSpeed4K={}\n", settings.scroll_speed_4k));
    content.push_str(&format!("ScrollSpeed7K={}\n", settings.scroll_speed_7k));
    content.push('\n');

    if let Err(e) = std::fs::write(SETTINGS_PATH, content) {
        warn!("Failed to save settings file: {e}");
    }
}

pub fn get() -> Settings {
    *SETTINGS.lock().unwrap()
}

pub fn update_global_offset(offset_s: f32) {
    {
        let mut settings = SETTINGS.lock().unwrap();
        if (settings.global_offset_seconds - offset_s).abs() < f32::EPSILON {
            return;
        }
        settings.global_offset_seconds = offset_s;
    }
    save();
}

/// Nudges the stored offset by one step and returns the new value.
pub fn adjust_global_offset(step_s: f32) -> f32 {
    let next = stepped_offset(get().global_offset_seconds, step_s);
    update_global_offset(next);
    next
}

pub fn update_scroll_speed(lane_count: u8, green_number: u32) {
    let clamped = green_number.clamp(SPEED_MIN, SPEED_MAX);
    {
        let mut settings = SETTINGS.lock().unwrap();
        let slot = if lane_count == 7 {
            &mut settings.scroll_speed_7k
        } else {
            &mut settings.scroll_speed_4k
        };
        // No change, no need to write to disk.
        if *slot == clamped {
            return;
        }
        *slot = clamped;
    }
    save();
}

/// Nudges the green number for a lane mode and returns the new value.
pub fn adjust_scroll_speed(lane_count: u8, delta: i32) -> u32 {
    let current = get().scroll_speed_for(lane_count);
    let next = clamped_speed(i64::from(current) + i64::from(delta));
    update_scroll_speed(lane_count, next);
    next
}

pub fn update_lane_count(lane_count: u8) {
    let normalized = if lane_count == 7 { 7 } else { 4 };
    {
        let mut settings = SETTINGS.lock().unwrap();
        if settings.lane_count == normalized {
            return;
        }
        settings.lane_count = normalized;
    }
    save();
}
