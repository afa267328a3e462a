//! Data type discriminant used for fast family membership tests

use std::fmt;

/// Classification of a value, one per concrete value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Not classified
    Undefined,
    /// Ordered collection of values
    Collection,
    Boolean,
    String,
    Code,
    Id,
    Markdown,
    Uri,
    Integer,
    PositiveInt,
    UnsignedInt,
    Decimal,
    Date,
    DateTime,
    Time,
    Quantity,
    /// Complex element not modelled by this crate
    Complex,
    /// Resource navigated by the reflection layer
    Resource,
}

impl DataType {
    /// Get the simple name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Undefined => "Undefined",
            Self::Collection => "Collection",
            Self::Boolean => "Boolean",
            Self::String => "String",
            Self::Code => "Code",
            Self::Id => "Id",
            Self::Markdown => "Markdown",
            Self::Uri => "Uri",
            Self::Integer => "Integer",
            Self::PositiveInt => "PositiveInt",
            Self::UnsignedInt => "UnsignedInt",
            Self::Decimal => "Decimal",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Time => "Time",
            Self::Quantity => "Quantity",
            Self::Complex => "Complex",
            Self::Resource => "Resource",
        }
    }

    /// Check if this is a primitive element type
    pub const fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Boolean
                | Self::String
                | Self::Code
                | Self::Id
                | Self::Markdown
                | Self::Uri
                | Self::Integer
                | Self::PositiveInt
                | Self::UnsignedInt
                | Self::Decimal
                | Self::Date
                | Self::DateTime
                | Self::Time
        )
    }

    /// Check if this is a complex element type
    pub const fn is_complex(&self) -> bool {
        matches!(self, Self::Quantity | Self::Complex)
    }

    /// Check if this is an element (primitive or complex)
    pub const fn is_element(&self) -> bool {
        self.is_primitive() || self.is_complex()
    }

    pub const fn is_resource(&self) -> bool {
        matches!(self, Self::Resource)
    }

    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Collection)
    }

    /// Check if this is an integer type
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::Integer | Self::PositiveInt | Self::UnsignedInt)
    }

    /// Check if this type is numeric
    pub const fn is_number(&self) -> bool {
        self.is_integer() || matches!(self, Self::Decimal)
    }

    /// Check if this is a string-like type
    pub const fn is_string(&self) -> bool {
        matches!(
            self,
            Self::String | Self::Code | Self::Id | Self::Markdown | Self::Uri
        )
    }

    /// Check if this type is temporal
    pub const fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::DateTime | Self::Time)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_families() {
        assert!(DataType::PositiveInt.is_number());
        assert!(DataType::Decimal.is_number());
        assert!(!DataType::Decimal.is_integer());
        assert!(!DataType::Quantity.is_number());

        assert!(DataType::Code.is_string());
        assert!(DataType::Uri.is_string());
        assert!(DataType::Time.is_temporal());
    }

    #[test]
    fn test_element_families_are_disjoint() {
        let all = [
            DataType::Undefined,
            DataType::Collection,
            DataType::Boolean,
            DataType::String,
            DataType::Code,
            DataType::Id,
            DataType::Markdown,
            DataType::Uri,
            DataType::Integer,
            DataType::PositiveInt,
            DataType::UnsignedInt,
            DataType::Decimal,
            DataType::Date,
            DataType::DateTime,
            DataType::Time,
            DataType::Quantity,
            DataType::Complex,
            DataType::Resource,
        ];
        for data_type in all {
            assert!(
                !(data_type.is_primitive() && data_type.is_complex()),
                "{} is both primitive and complex",
                data_type
            );
            if data_type.is_collection() || data_type.is_resource() {
                assert!(!data_type.is_element());
            }
        }
        assert!(!DataType::Undefined.is_element());
    }
}
