use crate::rfa::*;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::rfa::io_common::parse_timestamp;
use crate::rfa::io_dump::KNOWN_DATE_CORRECTIONS;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DateCorrection {
    /// Position of the vote in the dump, starting at 0.
    pub record: usize,
    pub date: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct InputSettings {
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "applyKnownDateCorrections")]
    pub apply_known_date_corrections: Option<bool>,
    #[serde(rename = "dateCorrections")]
    pub date_corrections: Option<Vec<DateCorrection>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "stripMarkup")]
    pub strip_markup: Option<bool>,
    #[serde(rename = "writeEvents")]
    pub write_events: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSettings {
    pub parallel: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RfaConfig {
    #[serde(rename = "inputSettings")]
    pub input_settings: InputSettings,
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(default)]
    pub engine: EngineSettings,
}

pub const DEFAULT_OUTPUT_DIRECTORY: &str = "out";

impl RfaConfig {
    /// The configuration used when only an input file is given.
    pub fn for_input(file_path: String) -> RfaConfig {
        RfaConfig {
            input_settings: InputSettings {
                file_path,
                apply_known_date_corrections: None,
                date_corrections: None,
            },
            output_settings: OutputSettings::default(),
            engine: EngineSettings::default(),
        }
    }

    /// All the date corrections to apply, the known ones first.
    pub fn date_corrections(&self) -> RfaResult<Vec<(usize, NaiveDateTime)>> {
        let mut res: Vec<(usize, NaiveDateTime)> = Vec::new();
        if self
            .input_settings
            .apply_known_date_corrections
            .unwrap_or(true)
        {
            for (record, date) in KNOWN_DATE_CORRECTIONS.iter() {
                res.push((*record, read_correction_date(date)?));
            }
        }
        for dc in self
            .input_settings
            .date_corrections
            .iter()
            .flat_map(|l| l.iter())
        {
            res.push((dc.record, read_correction_date(&dc.date)?));
        }
        Ok(res)
    }

    pub fn output_directory(&self) -> &str {
        self.output_settings
            .output_directory
            .as_deref()
            .unwrap_or(DEFAULT_OUTPUT_DIRECTORY)
    }

    pub fn strip_markup(&self) -> bool {
        self.output_settings.strip_markup.unwrap_or(true)
    }

    pub fn write_events(&self) -> bool {
        self.output_settings.write_events.unwrap_or(true)
    }

    pub fn agreement_rules(&self) -> AgreementRules {
        AgreementRules {
            parallelism: if self.engine.parallel.unwrap_or(false) {
                Parallelism::Rayon
            } else {
                Parallelism::Sequential
            },
        }
    }
}

fn read_correction_date(date: &str) -> RfaResult<NaiveDateTime> {
    parse_timestamp(date).context(InvalidDateCorrectionSnafu { date })
}

pub fn read_config(path: &str) -> RfaResult<RfaConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: RfaConfig = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}
