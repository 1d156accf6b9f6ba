//! Column helpers for the record/frame mapping.
//!
//! Reads are strict: a missing column, a wrong dtype, or a null in a required
//! column is reported as [`DataError::CacheCorruption`] instead of being
//! replaced by a default.

use chrono::NaiveDate;
use polars::prelude::*;

use crate::error::{DataError, Result};
use crate::types::Provenance;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn corrupt(name: &str, detail: impl std::fmt::Display) -> DataError {
    DataError::CacheCorruption(format!("column `{name}`: {detail}"))
}

fn required<T>(name: &str, values: Vec<Option<T>>) -> Result<Vec<T>> {
    values
        .into_iter()
        .enumerate()
        .map(|(row, v)| v.ok_or_else(|| corrupt(name, format!("null at row {row}"))))
        .collect()
}

pub(crate) fn build(columns: Vec<Column>) -> Result<DataFrame> {
    DataFrame::new(columns).map_err(|e| DataError::Cache(e.to_string()))
}

pub(crate) fn date_strings(dates: impl Iterator<Item = NaiveDate>) -> Vec<String> {
    dates.map(|d| d.format(DATE_FORMAT).to_string()).collect()
}

pub(crate) fn opt_date_strings(dates: impl Iterator<Item = Option<NaiveDate>>) -> Vec<Option<String>> {
    dates
        .map(|d| d.map(|d| d.format(DATE_FORMAT).to_string()))
        .collect()
}

pub(crate) fn provenance_strings(values: impl Iterator<Item = Provenance>) -> Vec<&'static str> {
    values.map(|p| p.as_str()).collect()
}

pub(crate) fn opt_text(frame: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let values = frame
        .column(name)
        .and_then(|c| c.str())
        .map_err(|e| corrupt(name, e))?;
    Ok(values.into_iter().map(|v| v.map(str::to_string)).collect())
}

pub(crate) fn text(frame: &DataFrame, name: &str) -> Result<Vec<String>> {
    required(name, opt_text(frame, name)?)
}

pub(crate) fn opt_int(frame: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let values = frame
        .column(name)
        .and_then(|c| c.i64())
        .map_err(|e| corrupt(name, e))?;
    Ok(values.into_iter().collect())
}

pub(crate) fn int(frame: &DataFrame, name: &str) -> Result<Vec<i64>> {
    required(name, opt_int(frame, name)?)
}

pub(crate) fn opt_float(frame: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let values = frame
        .column(name)
        .and_then(|c| c.f64())
        .map_err(|e| corrupt(name, e))?;
    Ok(values.into_iter().collect())
}

pub(crate) fn float(frame: &DataFrame, name: &str) -> Result<Vec<f64>> {
    required(name, opt_float(frame, name)?)
}

fn parse_date(name: &str, s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| corrupt(name, format!("{s}: {e}")))
}

pub(crate) fn date(frame: &DataFrame, name: &str) -> Result<Vec<NaiveDate>> {
    text(frame, name)?
        .iter()
        .map(|s| parse_date(name, s))
        .collect()
}

pub(crate) fn opt_date(frame: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>> {
    opt_text(frame, name)?
        .iter()
        .map(|s| s.as_deref().map(|s| parse_date(name, s)).transpose())
        .collect()
}

pub(crate) fn provenance(frame: &DataFrame) -> Result<Vec<Provenance>> {
    text(frame, "provenance")?
        .iter()
        .map(|s| s.parse().map_err(|e| corrupt("provenance", e)))
        .collect()
}
