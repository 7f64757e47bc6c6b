// SPDX-License-Identifier: MIT OR Apache-2.0
//! MaterialX semantic types and typed values.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Semantic type of a port, input or output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Floating point scalar
    Float,
    /// Integer scalar
    Integer,
    /// Boolean flag
    Boolean,
    /// 2D vector
    Vector2,
    /// 3D vector
    Vector3,
    /// 4D vector
    Vector4,
    /// RGB color
    Color3,
    /// RGBA color
    Color4,
    /// Freeform string
    String,
    /// Filesystem path to a texture or resource
    Filename,
    /// Surface shader closure
    SurfaceShader,
    /// Displacement shader closure
    DisplacementShader,
    /// Volume shader closure
    VolumeShader,
    /// Material reference
    Material,
    /// Multi-output marker type on document nodes
    MultiOutput,
    /// Any other MaterialX type (arrays, matrices, geomnames, ...)
    Custom(String),
}

impl ValueType {
    /// Parse a MaterialX type name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "float" => Self::Float,
            "integer" => Self::Integer,
            "boolean" => Self::Boolean,
            "vector2" => Self::Vector2,
            "vector3" => Self::Vector3,
            "vector4" => Self::Vector4,
            "color3" => Self::Color3,
            "color4" => Self::Color4,
            "string" => Self::String,
            "filename" => Self::Filename,
            "surfaceshader" => Self::SurfaceShader,
            "displacementshader" => Self::DisplacementShader,
            "volumeshader" => Self::VolumeShader,
            "material" => Self::Material,
            "multioutput" => Self::MultiOutput,
            other => Self::Custom(other.to_string()),
        }
    }

    /// The MaterialX type name.
    pub fn name(&self) -> &str {
        match self {
            Self::Float => "float",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Vector2 => "vector2",
            Self::Vector3 => "vector3",
            Self::Vector4 => "vector4",
            Self::Color3 => "color3",
            Self::Color4 => "color4",
            Self::String => "string",
            Self::Filename => "filename",
            Self::SurfaceShader => "surfaceshader",
            Self::DisplacementShader => "displacementshader",
            Self::VolumeShader => "volumeshader",
            Self::Material => "material",
            Self::MultiOutput => "multioutput",
            Self::Custom(name) => name,
        }
    }

    /// Number of numeric channels, for vector-like types.
    pub fn channels(&self) -> Option<usize> {
        match self {
            Self::Float => Some(1),
            Self::Vector2 => Some(2),
            Self::Vector3 | Self::Color3 => Some(3),
            Self::Vector4 | Self::Color4 => Some(4),
            _ => None,
        }
    }

    /// Whether this type is a shader closure (no widget-editable value).
    pub fn is_shader(&self) -> bool {
        matches!(
            self,
            Self::SurfaceShader | Self::DisplacementShader | Self::VolumeShader
        )
    }

    /// Deterministic display color for ports of this type.
    ///
    /// Seeded by the type name, so the same type string yields the same
    /// color across the whole graph, independent of the node instance.
    pub fn port_color(&self) -> [u8; 3] {
        let mut color = [0u8; 3];
        for (i, channel) in color.iter_mut().enumerate() {
            let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
            for byte in self.name().bytes().chain([b'0' + i as u8]) {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
            }
            *channel = (hash % 255) as u8;
        }
        color
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed value carried by a node property or document input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Floating point scalar
    Float(f32),
    /// Integer scalar
    Integer(i32),
    /// Boolean flag
    Boolean(bool),
    /// 2D vector
    Vector2([f32; 2]),
    /// 3D vector
    Vector3([f32; 3]),
    /// 4D vector
    Vector4([f32; 4]),
    /// RGB color
    Color3([f32; 3]),
    /// RGBA color
    Color4([f32; 4]),
    /// Freeform string (also used for filenames and unknown types)
    String(String),
}

impl Value {
    /// Default value for an input of the given type.
    ///
    /// Scalars default to zero, vectors and colors to the zero vector with
    /// the correct channel count (color4 alpha 1), strings and filenames to
    /// the empty string. Types without a widget representation fall back to
    /// a generic string value.
    pub fn default_for(ty: &ValueType) -> Self {
        match ty {
            ValueType::Float => Self::Float(0.0),
            ValueType::Integer => Self::Integer(0),
            ValueType::Boolean => Self::Boolean(false),
            ValueType::Vector2 => Self::Vector2([0.0; 2]),
            ValueType::Vector3 => Self::Vector3([0.0; 3]),
            ValueType::Vector4 => Self::Vector4([0.0; 4]),
            ValueType::Color3 => Self::Color3([0.0; 3]),
            ValueType::Color4 => Self::Color4([0.0, 0.0, 0.0, 1.0]),
            ValueType::String | ValueType::Filename => Self::String(String::new()),
            other => {
                if !other.is_shader() && !matches!(other, ValueType::Material) {
                    warn!(ty = %other, "no widget representation for type, storing as text");
                }
                Self::String(String::new())
            }
        }
    }

    /// Parse a MaterialX value string (comma-separated components).
    pub fn parse(ty: &ValueType, text: &str) -> Option<Self> {
        fn components<const N: usize>(text: &str) -> Option<[f32; N]> {
            let mut out = [0.0f32; N];
            let mut parts = text.split(',');
            for slot in &mut out {
                *slot = parts.next()?.trim().parse().ok()?;
            }
            parts.next().is_none().then_some(out)
        }

        match ty {
            ValueType::Float => text.trim().parse().ok().map(Self::Float),
            ValueType::Integer => text.trim().parse().ok().map(Self::Integer),
            ValueType::Boolean => match text.trim() {
                "true" => Some(Self::Boolean(true)),
                "false" => Some(Self::Boolean(false)),
                _ => None,
            },
            ValueType::Vector2 => components(text).map(Self::Vector2),
            ValueType::Vector3 => components(text).map(Self::Vector3),
            ValueType::Vector4 => components(text).map(Self::Vector4),
            ValueType::Color3 => components(text).map(Self::Color3),
            ValueType::Color4 => components(text).map(Self::Color4),
            _ => Some(Self::String(text.to_string())),
        }
    }

    /// Format as a MaterialX value string.
    pub fn to_value_string(&self) -> String {
        fn join(values: &[f32]) -> String {
            values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        }

        match self {
            Self::Float(v) => v.to_string(),
            Self::Integer(v) => v.to_string(),
            Self::Boolean(v) => v.to_string(),
            Self::Vector2(v) => join(v),
            Self::Vector3(v) | Self::Color3(v) => join(v),
            Self::Vector4(v) | Self::Color4(v) => join(v),
            Self::String(v) => v.clone(),
        }
    }

    /// Whether this is an empty string value (no value worth serializing).
    pub fn is_empty_string(&self) -> bool {
        matches!(self, Self::String(s) if s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_round_trip() {
        for name in ["float", "color3", "vector4", "filename", "surfaceshader", "BSDF"] {
            assert_eq!(ValueType::from_name(name).name(), name);
        }
    }

    #[test]
    fn port_color_is_stable_per_type() {
        assert_eq!(
            ValueType::Color3.port_color(),
            ValueType::from_name("color3").port_color()
        );
        assert_ne!(ValueType::Color3.port_color(), ValueType::Vector3.port_color());
    }

    #[test]
    fn defaults_match_channel_counts() {
        assert_eq!(Value::default_for(&ValueType::Float), Value::Float(0.0));
        assert_eq!(Value::default_for(&ValueType::Color3), Value::Color3([0.0; 3]));
        assert_eq!(
            Value::default_for(&ValueType::Color4),
            Value::Color4([0.0, 0.0, 0.0, 1.0])
        );
        assert_eq!(Value::default_for(&ValueType::Filename), Value::String(String::new()));
    }

    #[test]
    fn parse_and_print_values() {
        let v = Value::parse(&ValueType::Color3, "0.2, 0.4, 0.6").unwrap();
        assert_eq!(v, Value::Color3([0.2, 0.4, 0.6]));
        assert_eq!(v.to_value_string(), "0.2, 0.4, 0.6");
        assert_eq!(Value::parse(&ValueType::Float, "1.5"), Some(Value::Float(1.5)));
        assert_eq!(Value::parse(&ValueType::Vector2, "1, 2, 3"), None);
    }
}
