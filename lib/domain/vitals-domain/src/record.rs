//! Inbound per-user metric snapshot and its schema checks.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

/// One user's metric snapshot as published by the ingest service.
///
/// Only [`MetricRecord::from_json`] hands out records, and it never returns one
/// that failed [`MetricRecord::validate`]. Unknown fields in the payload are
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub gender: Gender,
    pub age: i64,
    pub sleep_duration: f64,
    pub quality_of_sleep: i64,
    pub physical_activity_level: i64,
    #[serde(default)]
    pub stress_level: Option<i64>,
    pub bmi_category: BmiCategory,
    pub systolic_bp: i64,
    pub diastolic_bp: i64,
    pub heart_rate: i64,
    pub daily_steps: i64,
}

impl MetricRecord {
    /// Decode a UTF-8 JSON payload and check every field against its bounds.
    pub fn from_json(payload: &[u8]) -> Result<Self, ValidationError> {
        let value: serde_json::Value = serde_json::from_slice(payload)?;
        if !value.is_object() {
            return Err(ValidationError::NotAnObject(json_kind(&value)));
        }
        let record: MetricRecord = serde_json::from_value(value)?;
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_int("age", self.age, 0, Some(120))?;
        check_float("sleep_duration", self.sleep_duration, 0.0, 24.0)?;
        check_int("quality_of_sleep", self.quality_of_sleep, 1, Some(10))?;
        check_int("physical_activity_level", self.physical_activity_level, 0, None)?;
        if let Some(stress_level) = self.stress_level {
            check_int("stress_level", stress_level, 1, Some(10))?;
        }
        check_int("systolic_bp", self.systolic_bp, 80, Some(250))?;
        check_int("diastolic_bp", self.diastolic_bp, 40, Some(150))?;
        check_int("heart_rate", self.heart_rate, 30, Some(220))?;
        check_int("daily_steps", self.daily_steps, 0, None)?;
        Ok(())
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn check_int(
    field: &'static str,
    value: i64,
    min: i64,
    max: Option<i64>,
) -> Result<(), ValidationError> {
    let above_max = max.is_some_and(|max| value > max);
    if value < min || above_max {
        return Err(ValidationError::OutOfRange {
            field,
            value: value.to_string(),
            bounds: describe_bounds(min.to_string(), max.map(|max| max.to_string())),
        });
    }
    Ok(())
}

fn check_float(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value: value.to_string(),
            bounds: describe_bounds(min.to_string(), Some(max.to_string())),
        });
    }
    Ok(())
}

fn describe_bounds(min: String, max: Option<String>) -> String {
    match max {
        Some(max) => format!("[{min}, {max}]"),
        None => format!(">= {min}"),
    }
}
