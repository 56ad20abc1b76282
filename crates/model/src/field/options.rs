use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DateFormat {
    #[default]
    Eu,
    Us,
    Iso,
}

impl DateFormat {
    /// Pattern understood by PostgreSQL's `TO_CHAR`.
    pub fn to_char_pattern(&self) -> &'static str {
        match self {
            DateFormat::Eu => "DD/MM/YYYY",
            DateFormat::Us => "MM/DD/YYYY",
            DateFormat::Iso => "YYYY-MM-DD",
        }
    }

    /// Equivalent `chrono` format string.
    pub fn chrono_pattern(&self) -> &'static str {
        match self {
            DateFormat::Eu => "%d/%m/%Y",
            DateFormat::Us => "%m/%d/%Y",
            DateFormat::Iso => "%Y-%m-%d",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "24")]
    Hour24,
    #[serde(rename = "12")]
    Hour12,
}

impl TimeFormat {
    pub fn to_char_pattern(&self) -> &'static str {
        match self {
            TimeFormat::Hour24 => "HH24:MI",
            TimeFormat::Hour12 => "HH12:MIAM",
        }
    }

    pub fn chrono_pattern(&self) -> &'static str {
        match self {
            TimeFormat::Hour24 => "%H:%M",
            TimeFormat::Hour12 => "%I:%M%p",
        }
    }
}

/// Formatting and timezone options shared by every date-like field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateOptions {
    pub include_time: bool,
    pub date_format: DateFormat,
    pub time_format: TimeFormat,
    pub force_timezone: Option<String>,
    pub show_tzinfo: bool,
}

impl DateOptions {
    pub fn to_char_pattern(&self) -> String {
        if self.include_time {
            format!(
                "{} {}",
                self.date_format.to_char_pattern(),
                self.time_format.to_char_pattern()
            )
        } else {
            self.date_format.to_char_pattern().to_string()
        }
    }

    pub fn chrono_pattern(&self) -> String {
        if self.include_time {
            format!(
                "{} {}",
                self.date_format.chrono_pattern(),
                self.time_format.chrono_pattern()
            )
        } else {
            self.date_format.chrono_pattern().to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberOptions {
    pub decimal_places: u32,
    pub negative: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingOptions {
    pub max_value: u8,
}

impl Default for RatingOptions {
    fn default() -> Self {
        Self { max_value: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: i64,
    pub value: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectOptions {
    pub select_options: Vec<SelectOption>,
}

impl SelectOptions {
    pub fn ids_matching<F>(&self, predicate: F) -> Vec<i64>
    where
        F: Fn(&str) -> bool,
    {
        self.select_options
            .iter()
            .filter(|option| predicate(&option.value))
            .map(|option| option.id)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRowOptions {
    pub link_row_table_id: u64,
}
