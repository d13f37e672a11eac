//! Audio filters understood by the node.
//!
//! A [`Filter`] serializes to the single-key object the node expects inside a
//! `filters` op, e.g. `{"timescale": {"speed": 1.2, "pitch": 1.2, "rate": 1.0}}`.

use serde::{Deserialize, Serialize};

use crate::error::{PlayerError, PlayerResult};

pub const EQUALIZER_BANDS: u8 = 15;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    Timescale(Timescale),
    Karaoke(Karaoke),
    Tremolo(Tremolo),
    Vibrato(Vibrato),
    Equalizer(Vec<EqualizerBand>),
    Rotation(Rotation),
    LowPass(LowPass),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Timescale {
    pub speed: f64,
    pub pitch: f64,
    pub rate: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Karaoke {
    pub level: f64,
    pub mono_level: f64,
    pub filter_band: f64,
    pub filter_width: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Tremolo {
    pub frequency: f64,
    pub depth: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Vibrato {
    pub frequency: f64,
    pub depth: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct EqualizerBand {
    pub band: u8,
    pub gain: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rotation {
    pub rotation_hz: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LowPass {
    pub smoothing: f64,
}

fn invalid(reason: impl Into<String>) -> PlayerError {
    PlayerError::InvalidFilter(reason.into())
}

impl Filter {
    pub fn timescale(speed: f64, pitch: f64, rate: f64) -> PlayerResult<Self> {
        if speed <= 0.0 || pitch <= 0.0 || rate <= 0.0 {
            return Err(invalid("timescale speed, pitch and rate must be greater than 0"));
        }

        Ok(Filter::Timescale(Timescale { speed, pitch, rate }))
    }

    pub fn karaoke(level: f64, mono_level: f64, filter_band: f64, filter_width: f64) -> Self {
        Filter::Karaoke(Karaoke {
            level,
            mono_level,
            filter_band,
            filter_width,
        })
    }

    pub fn tremolo(frequency: f64, depth: f64) -> PlayerResult<Self> {
        if frequency <= 0.0 {
            return Err(invalid("tremolo frequency must be greater than 0"));
        }
        if depth <= 0.0 || depth > 1.0 {
            return Err(invalid("tremolo depth must be between 0 and 1"));
        }

        Ok(Filter::Tremolo(Tremolo { frequency, depth }))
    }

    pub fn vibrato(frequency: f64, depth: f64) -> PlayerResult<Self> {
        if frequency <= 0.0 || frequency > 14.0 {
            return Err(invalid("vibrato frequency must be between 0 and 14"));
        }
        if depth <= 0.0 || depth > 1.0 {
            return Err(invalid("vibrato depth must be between 0 and 1"));
        }

        Ok(Filter::Vibrato(Vibrato { frequency, depth }))
    }

    /// Bands not listed keep their default gain on the node.
    pub fn equalizer(levels: &[(u8, f64)]) -> PlayerResult<Self> {
        let mut bands = Vec::with_capacity(levels.len());

        for &(band, gain) in levels {
            if band >= EQUALIZER_BANDS {
                return Err(invalid(format!("equalizer band {} does not exist", band)));
            }
            if !(-0.25..=1.0).contains(&gain) {
                return Err(invalid(format!("equalizer gain {} is out of range", gain)));
            }
            bands.push(EqualizerBand { band, gain });
        }

        Ok(Filter::Equalizer(bands))
    }

    pub fn rotation(rotation_hz: f64) -> Self {
        Filter::Rotation(Rotation { rotation_hz })
    }

    pub fn low_pass(smoothing: f64) -> PlayerResult<Self> {
        if smoothing <= 1.0 {
            return Err(invalid("low pass smoothing must be greater than 1"));
        }

        Ok(Filter::LowPass(LowPass { smoothing }))
    }

    pub fn nightcore() -> Self {
        Filter::Timescale(Timescale {
            speed: 1.25,
            pitch: 1.3,
            rate: 1.0,
        })
    }

    pub fn vaporwave() -> Self {
        Filter::Timescale(Timescale {
            speed: 0.8,
            pitch: 0.8,
            rate: 1.0,
        })
    }

    pub fn bass_boost() -> Self {
        Filter::Equalizer(vec![
            EqualizerBand { band: 0, gain: 0.6 },
            EqualizerBand { band: 1, gain: 0.67 },
            EqualizerBand { band: 2, gain: 0.67 },
            EqualizerBand { band: 3, gain: 0.4 },
            EqualizerBand { band: 4, gain: -0.25 },
            EqualizerBand { band: 5, gain: 0.15 },
            EqualizerBand { band: 6, gain: -0.2 },
            EqualizerBand { band: 7, gain: 0.23 },
        ])
    }

    /// Resets every band to unity gain.
    pub fn flat() -> Self {
        Filter::Equalizer(
            (0..EQUALIZER_BANDS)
                .map(|band| EqualizerBand { band, gain: 0.0 })
                .collect(),
        )
    }

    /// Looks up a preset by the name used in chat commands.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "nightcore" => Some(Filter::nightcore()),
            "vaporwave" => Some(Filter::vaporwave()),
            "bassboost" | "bass_boost" => Some(Filter::bass_boost()),
            "flat" | "off" | "none" => Some(Filter::flat()),
            "8d" | "rotation" => Some(Filter::rotation(0.2)),
            "karaoke" => Some(Filter::karaoke(1.0, 1.0, 220.0, 100.0)),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Filter::Timescale(_) => "timescale",
            Filter::Karaoke(_) => "karaoke",
            Filter::Tremolo(_) => "tremolo",
            Filter::Vibrato(_) => "vibrato",
            Filter::Equalizer(_) => "equalizer",
            Filter::Rotation(_) => "rotation",
            Filter::LowPass(_) => "lowPass",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timescale_payload_is_keyed_by_filter_name() {
        let filter = Filter::timescale(1.2, 1.1, 1.0).unwrap();

        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({ "timescale": { "speed": 1.2, "pitch": 1.1, "rate": 1.0 } })
        );
    }

    #[test]
    fn karaoke_and_low_pass_use_camel_case() {
        let karaoke = serde_json::to_value(Filter::karaoke(1.0, 0.5, 220.0, 100.0)).unwrap();
        assert_eq!(karaoke["karaoke"]["monoLevel"], json!(0.5));
        assert_eq!(karaoke["karaoke"]["filterBand"], json!(220.0));

        let low_pass = serde_json::to_value(Filter::low_pass(20.0).unwrap()).unwrap();
        assert_eq!(low_pass, json!({ "lowPass": { "smoothing": 20.0 } }));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(Filter::timescale(0.0, 1.0, 1.0).is_err());
        assert!(Filter::tremolo(2.0, 1.5).is_err());
        assert!(Filter::tremolo(0.0, 0.5).is_err());
        assert!(Filter::vibrato(15.0, 0.5).is_err());
        assert!(Filter::equalizer(&[(15, 0.1)]).is_err());
        assert!(Filter::equalizer(&[(3, -0.3)]).is_err());
        assert!(Filter::low_pass(1.0).is_err());
    }

    #[test]
    fn flat_equalizer_covers_every_band() {
        match Filter::flat() {
            Filter::Equalizer(bands) => {
                assert_eq!(bands.len(), EQUALIZER_BANDS as usize);
                assert!(bands.iter().all(|b| b.gain == 0.0));
            }
            other => panic!("unexpected filter {:?}", other),
        }
    }

    #[test]
    fn presets_resolve_by_command_name() {
        assert_eq!(Filter::preset("nightcore"), Some(Filter::nightcore()));
        assert_eq!(Filter::preset("off"), Some(Filter::flat()));
        assert!(Filter::preset("chipmunk").is_none());
    }

    #[test]
    fn presets_pass_their_own_range_checks() {
        let names = ["nightcore", "vaporwave", "bassboost", "flat", "8d", "karaoke"];

        for name in names {
            let preset = Filter::preset(name).unwrap();
            let rebuilt = match &preset {
                Filter::Timescale(t) => Filter::timescale(t.speed, t.pitch, t.rate).unwrap(),
                Filter::Equalizer(bands) => {
                    let levels: Vec<_> = bands.iter().map(|b| (b.band, b.gain)).collect();
                    Filter::equalizer(&levels).unwrap()
                }
                other => other.clone(),
            };
            assert_eq!(rebuilt, preset, "preset `{}`", name);
        }
    }
}
