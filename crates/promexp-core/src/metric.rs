//! A single named, typed measurement and its text exposition.
//!
//! Rendered form:
//! ```text
//! # HELP <name> <help>        (only when help is set)
//! # TYPE <name> <type>
//! <name>{<labels>} <value>    (braces omitted when there are no labels)
//! ```

use std::fmt::{self, Write};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{ExporterError, Result};
use crate::labels::{is_valid_name, LabelFilter, LabelSet};

/// Prometheus metric types supported by the exposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MetricType {
    Counter,
    Gauge,
    #[default]
    Untyped,
}

impl MetricType {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
            MetricType::Untyped => "untyped",
        }
    }
}

impl FromStr for MetricType {
    type Err = ExporterError;

    /// Case-insensitive; unknown names are a lookup error.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "counter" => Ok(MetricType::Counter),
            "gauge" => Ok(MetricType::Gauge),
            "untyped" => Ok(MetricType::Untyped),
            _ => Err(ExporterError::Lookup(format!("unknown metric type: {s}"))),
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric metric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
}

impl MetricValue {
    /// Parse a textual number; anything non-numeric is a type error.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if let Ok(i) = raw.parse::<i64>() {
            return Ok(MetricValue::Int(i));
        }
        raw.parse::<f64>()
            .map(MetricValue::Float)
            .map_err(|_| ExporterError::Type(format!("metric value must be numeric, got {raw:?}")))
    }
}

impl Default for MetricValue {
    fn default() -> Self {
        MetricValue::Int(0)
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Int(v)
    }
}

impl From<i32> for MetricValue {
    fn from(v: i32) -> Self {
        MetricValue::Int(v.into())
    }
}

impl From<u32> for MetricValue {
    fn from(v: u32) -> Self {
        MetricValue::Int(v.into())
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

impl From<f32> for MetricValue {
    fn from(v: f32) -> Self {
        MetricValue::Float(v.into())
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricValue::Int(i) => write!(f, "{i}"),
            MetricValue::Float(v) if v.is_nan() => f.write_str("NaN"),
            MetricValue::Float(v) if v.is_infinite() => {
                f.write_str(if v > 0.0 { "+Inf" } else { "-Inf" })
            }
            MetricValue::Float(v) if v != 0.0 && (v.abs() >= 1e16 || v.abs() < 1e-4) => {
                write_exponent(f, v)
            }
            // Whole floats keep a trailing ".0".
            MetricValue::Float(v) if v.fract() == 0.0 => write!(f, "{v:.1}"),
            MetricValue::Float(v) => write!(f, "{v}"),
        }
    }
}

/// `1e+20`, `1.5e-05`: signed exponent with at least two digits.
fn write_exponent(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    let raw = format!("{v:e}");
    let parts = raw
        .split_once('e')
        .and_then(|(mantissa, exp)| Some((mantissa, exp.parse::<i32>().ok()?)));
    match parts {
        Some((mantissa, exp)) => {
            let sign = if exp < 0 { '-' } else { '+' };
            write!(f, "{mantissa}e{sign}{:02}", exp.unsigned_abs())
        }
        None => f.write_str(&raw),
    }
}

type ValueFn = dyn Fn() -> Option<MetricValue> + Send + Sync;

/// Where a metric's value comes from: a stored number, or a function
/// evaluated on every read. A function returning `None` means the value
/// is currently undefined and the metric is skipped on export.
#[derive(Clone)]
pub enum ValueSource {
    Stored(MetricValue),
    Computed(Arc<ValueFn>),
}

impl ValueSource {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn() -> Option<MetricValue> + Send + Sync + 'static,
    {
        ValueSource::Computed(Arc::new(f))
    }

    fn read(&self) -> Option<MetricValue> {
        match self {
            ValueSource::Stored(v) => Some(*v),
            ValueSource::Computed(f) => f(),
        }
    }
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Stored(v) => f.debug_tuple("Stored").field(v).finish(),
            ValueSource::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// A named measurement carrying its own labels.
///
/// The name is fixed at construction: there is no setter. Labels are
/// copied in, so a metric never aliases the caller's `LabelSet`.
#[derive(Debug, Clone)]
pub struct Metric {
    name: String,
    metric_type: MetricType,
    help: Option<String>,
    labels: LabelSet,
    value: ValueSource,
}

impl Metric {
    /// Untyped metric with value 0 and no labels.
    ///
    /// Spaces in `name` become underscores before validation.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into().replace(' ', "_");
        if !is_valid_name(&name) {
            return Err(ExporterError::Validation(format!("invalid metric name: {name:?}")));
        }
        Ok(Self {
            name,
            metric_type: MetricType::default(),
            help: None,
            labels: LabelSet::new(),
            value: ValueSource::Stored(MetricValue::default()),
        })
    }

    pub fn with_type(mut self, metric_type: MetricType) -> Self {
        self.metric_type = metric_type;
        self
    }

    /// Resolve the type from its (case-insensitive) name.
    pub fn with_type_name(mut self, metric_type: &str) -> Result<Self> {
        self.metric_type = metric_type.parse()?;
        Ok(self)
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_labels(mut self, labels: &LabelSet) -> Self {
        self.labels = labels.clone();
        self
    }

    pub fn with_value(mut self, value: impl Into<MetricValue>) -> Self {
        self.value = ValueSource::Stored(value.into());
        self
    }

    pub fn with_value_fn<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Option<MetricValue> + Send + Sync + 'static,
    {
        self.value = ValueSource::computed(f);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Mutable access; label writes still go through `LabelSet::set`.
    pub fn labels_mut(&mut self) -> &mut LabelSet {
        &mut self.labels
    }

    /// Current value. Computed sources are evaluated on every call.
    pub fn value(&self) -> Option<MetricValue> {
        self.value.read()
    }

    pub fn set_value(&mut self, value: impl Into<MetricValue>) {
        self.value = ValueSource::Stored(value.into());
    }

    /// Store a value given as text; non-numeric input is a type error and
    /// leaves the current value unchanged.
    pub fn set_value_str(&mut self, raw: &str) -> Result<()> {
        self.value = ValueSource::Stored(MetricValue::parse(raw)?);
        Ok(())
    }

    pub fn matches(&self, predicate: &LabelFilter) -> bool {
        self.labels.matches(predicate)
    }

    /// Exposition text, or `None` when the value is currently undefined.
    /// The value is read exactly once.
    pub fn render(&self) -> Option<String> {
        let value = self.value()?;
        let mut out = String::new();
        self.write_exposition(&mut out, &value.to_string());
        Some(out)
    }

    /// Exposition text; an undefined value renders as `NaN`.
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    fn write_exposition(&self, out: &mut String, value: &str) {
        if let Some(help) = &self.help {
            let _ = writeln!(out, "# HELP {} {}", self.name, help);
        }
        let _ = writeln!(out, "# TYPE {} {}", self.name, self.metric_type);
        out.push_str(&self.name);
        if !self.labels.is_empty() {
            let _ = write!(out, "{{{}}}", self.labels);
        }
        let _ = write!(out, " {value}");
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self
            .value()
            .map_or_else(|| "NaN".to_string(), |v| v.to_string());
        let mut out = String::new();
        self.write_exposition(&mut out, &value);
        f.write_str(&out)
    }
}
