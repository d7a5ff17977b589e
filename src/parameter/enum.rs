use four_cc::FourCC;

use super::{Parameter, ParameterType, ParameterValueUpdate};

// -------------------------------------------------------------------------------------------------

/// An enum parameter descriptor.
///
/// Values usually are the `strum::VariantNames` of some `#[repr(u8)]` enum, so variant
/// indices can be converted back to enum values with `FromRepr` or `try_from`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumParameter {
    id: FourCC,
    name: &'static str,
    values: &'static [&'static str],
    default_index: usize,
}

impl EnumParameter {
    pub const fn new(
        id: FourCC,
        name: &'static str,
        values: &'static [&'static str],
        default_index: usize,
    ) -> Self {
        assert!(!values.is_empty(), "Enum parameters need at least one value");
        assert!(default_index < values.len(), "Invalid parameter default value");
        Self {
            id,
            name,
            values,
            default_index,
        }
    }

    pub fn values(&self) -> &'static [&'static str] {
        self.values
    }

    pub fn default_index(&self) -> usize {
        self.default_index
    }

    pub fn normalize_index(&self, index: usize) -> f32 {
        if self.values.len() > 1 {
            index.min(self.values.len() - 1) as f32 / (self.values.len() - 1) as f32
        } else {
            0.0
        }
    }

    pub fn denormalize_index(&self, normalized: f32) -> usize {
        let normalized = normalized.clamp(0.0, 1.0);
        (normalized * (self.values.len() - 1) as f32).round() as usize
    }

    /// Resolve a value update into a variant index. Returns `None` for out of range plain indices.
    pub fn index_from_update(&self, update: ParameterValueUpdate) -> Option<usize> {
        match update {
            ParameterValueUpdate::Plain(value) => {
                let index = value.round();
                if index >= 0.0 && (index as usize) < self.values.len() {
                    Some(index as usize)
                } else {
                    None
                }
            }
            ParameterValueUpdate::Normalized(normalized) => {
                Some(self.denormalize_index(normalized))
            }
        }
    }
}

impl Parameter for EnumParameter {
    fn id(&self) -> FourCC {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn parameter_type(&self) -> ParameterType {
        ParameterType::Enum {
            values: self.values,
            default_index: self.default_index,
        }
    }

    fn default_normalized_value(&self) -> f32 {
        self.normalize_index(self.default_index)
    }

    fn normalized_value_to_string(&self, normalized: f32, _include_unit: bool) -> String {
        self.values[self.denormalize_index(normalized)].to_string()
    }

    fn string_to_normalized_value(&self, string: &str) -> Option<f32> {
        let string = string.trim();
        let index = self
            .values
            .iter()
            .position(|v| v.eq_ignore_ascii_case(string))?;
        Some(self.normalize_index(index))
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MODE: EnumParameter =
        EnumParameter::new(FourCC(*b"TEST"), "Mode", &["One", "Two", "Three"], 1);

    #[test]
    fn updates() {
        assert_eq!(MODE.default_normalized_value(), 0.5);
        assert_eq!(MODE.index_from_update(ParameterValueUpdate::Plain(2.0)), Some(2));
        assert_eq!(MODE.index_from_update(ParameterValueUpdate::Plain(3.0)), None);
        assert_eq!(MODE.index_from_update(ParameterValueUpdate::Plain(-1.0)), None);
        assert_eq!(
            MODE.index_from_update(ParameterValueUpdate::Normalized(1.0)),
            Some(2)
        );
        assert_eq!(MODE.normalized_value_to_string(0.0, true), "One");
        assert_eq!(MODE.string_to_normalized_value("three"), Some(1.0));
        assert_eq!(MODE.string_to_normalized_value("four"), None);
    }
}
