use std::ops::RangeInclusive;

use four_cc::FourCC;

use super::{Parameter, ParameterType, ParameterValueUpdate};

// -------------------------------------------------------------------------------------------------

/// A continuous (float) parameter descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatParameter {
    id: FourCC,
    name: &'static str,
    range: RangeInclusive<f32>,
    default: f32,
    unit: &'static str,
}

impl FloatParameter {
    /// Create a new float parameter descriptor.
    pub const fn new(
        id: FourCC,
        name: &'static str,
        range: RangeInclusive<f32>,
        default: f32,
    ) -> Self {
        assert!(
            default >= *range.start() && default <= *range.end(),
            "Invalid parameter default value"
        );
        Self {
            id,
            name,
            range,
            default,
            unit: "",
        }
    }

    /// Optional unit for string displays.
    pub const fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    /// The parameter's value range.
    pub fn range(&self) -> &RangeInclusive<f32> {
        &self.range
    }

    /// The parameter's default value.
    pub fn default_value(&self) -> f32 {
        self.default
    }

    /// The parameter's display unit. May be empty.
    pub fn unit(&self) -> &'static str {
        self.unit
    }

    /// Clamp the given plain value to the parameter's range. NaNs resolve to the default value.
    pub fn clamp_value(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        value.clamp(*self.range.start(), *self.range.end())
    }

    /// Normalize the given plain value to a 0.0-1.0 range.
    pub fn normalize_value(&self, value: f32) -> f32 {
        let (start, end) = (*self.range.start(), *self.range.end());
        if end > start {
            ((value - start) / (end - start)).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Denormalize a 0.0-1.0 ranged value to the corresponding plain value.
    pub fn denormalize_value(&self, normalized: f32) -> f32 {
        let normalized = if normalized.is_nan() {
            self.normalize_value(self.default)
        } else {
            normalized.clamp(0.0, 1.0)
        };
        *self.range.start() + normalized * (*self.range.end() - *self.range.start())
    }

    /// Resolve a value update into a plain, clamped value of this parameter.
    pub fn value_from_update(&self, update: ParameterValueUpdate) -> f32 {
        match update {
            ParameterValueUpdate::Plain(value) => self.clamp_value(value),
            ParameterValueUpdate::Normalized(normalized) => self.denormalize_value(normalized),
        }
    }

    /// Convert the given plain value to a string.
    pub fn value_to_string(&self, value: f32, include_unit: bool) -> String {
        if include_unit && !self.unit.is_empty() {
            format!("{:.2} {}", value, self.unit)
        } else {
            format!("{:.2}", value)
        }
    }

    /// Convert the given string to a clamped plain value.
    pub fn string_to_value(&self, string: &str) -> Option<f32> {
        let value = string
            .trim()
            .trim_end_matches(self.unit)
            .trim()
            .parse::<f32>()
            .ok()?;
        Some(self.clamp_value(value))
    }
}

impl Parameter for FloatParameter {
    fn id(&self) -> FourCC {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn parameter_type(&self) -> ParameterType {
        ParameterType::Float {
            range: self.range.clone(),
            default: self.default,
        }
    }

    fn default_normalized_value(&self) -> f32 {
        self.normalize_value(self.default)
    }

    fn normalized_value_to_string(&self, normalized: f32, include_unit: bool) -> String {
        self.value_to_string(self.denormalize_value(normalized), include_unit)
    }

    fn string_to_normalized_value(&self, string: &str) -> Option<f32> {
        let value = self.string_to_value(string)?;
        Some(self.normalize_value(value))
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TUNING: FloatParameter =
        FloatParameter::new(FourCC(*b"TEST"), "Tuning", -1.0..=1.0, 0.0).with_unit("x");

    #[test]
    fn normalization() {
        assert_eq!(TUNING.normalize_value(0.0), 0.5);
        assert_eq!(TUNING.denormalize_value(1.0), 1.0);
        assert_eq!(TUNING.denormalize_value(2.0), 1.0);
        assert_eq!(TUNING.default_normalized_value(), 0.5);
        assert_eq!(
            TUNING.value_from_update(ParameterValueUpdate::Normalized(0.25)),
            -0.5
        );
        assert_eq!(TUNING.value_from_update(ParameterValueUpdate::Plain(4.0)), 1.0);
        assert_eq!(TUNING.value_from_update(ParameterValueUpdate::Plain(f32::NAN)), 0.0);
    }

    #[test]
    fn string_conversion() {
        assert_eq!(TUNING.value_to_string(0.5, true), "0.50 x");
        assert_eq!(TUNING.value_to_string(0.5, false), "0.50");
        assert_eq!(TUNING.string_to_value(" 0.25 x"), Some(0.25));
        assert_eq!(TUNING.string_to_value("8"), Some(1.0));
        assert_eq!(TUNING.string_to_value("abc"), None);
        assert_eq!(TUNING.string_to_normalized_value("-1"), Some(0.0));
    }
}
