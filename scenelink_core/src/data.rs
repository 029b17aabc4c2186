// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed values held by data instances.

use core::fmt;

/// The type of a [`DataValue`].
///
/// A data-reference link may only connect a provider and a consumer whose
/// values have the same type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// `bool`.
    Bool,
    /// `i32`.
    Int32,
    /// `f32`.
    Float,
    /// Two `f32` components.
    Vector2f,
    /// Three `f32` components.
    Vector3f,
    /// Four `f32` components.
    Vector4f,
    /// Two `i32` components.
    Vector2i,
    /// Three `i32` components.
    Vector3i,
    /// Four `i32` components.
    Vector4i,
    /// Column-major 2×2 `f32` matrix.
    Matrix22f,
    /// Column-major 3×3 `f32` matrix.
    Matrix33f,
    /// Column-major 4×4 `f32` matrix.
    Matrix44f,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A single typed value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DataValue {
    /// `bool`.
    Bool(bool),
    /// `i32`.
    Int32(i32),
    /// `f32`.
    Float(f32),
    /// Two `f32` components.
    Vector2f([f32; 2]),
    /// Three `f32` components.
    Vector3f([f32; 3]),
    /// Four `f32` components.
    Vector4f([f32; 4]),
    /// Two `i32` components.
    Vector2i([i32; 2]),
    /// Three `i32` components.
    Vector3i([i32; 3]),
    /// Four `i32` components.
    Vector4i([i32; 4]),
    /// Column-major 2×2 `f32` matrix.
    Matrix22f([f32; 4]),
    /// Column-major 3×3 `f32` matrix.
    Matrix33f([f32; 9]),
    /// Column-major 4×4 `f32` matrix.
    Matrix44f([f32; 16]),
}

impl DataValue {
    /// Returns the type of this value.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            Self::Bool(_) => DataType::Bool,
            Self::Int32(_) => DataType::Int32,
            Self::Float(_) => DataType::Float,
            Self::Vector2f(_) => DataType::Vector2f,
            Self::Vector3f(_) => DataType::Vector3f,
            Self::Vector4f(_) => DataType::Vector4f,
            Self::Vector2i(_) => DataType::Vector2i,
            Self::Vector3i(_) => DataType::Vector3i,
            Self::Vector4i(_) => DataType::Vector4i,
            Self::Matrix22f(_) => DataType::Matrix22f,
            Self::Matrix33f(_) => DataType::Matrix33f,
            Self::Matrix44f(_) => DataType::Matrix44f,
        }
    }

    /// The zero value of the given type (identity for matrices).
    #[must_use]
    pub const fn default_for(data_type: DataType) -> Self {
        match data_type {
            DataType::Bool => Self::Bool(false),
            DataType::Int32 => Self::Int32(0),
            DataType::Float => Self::Float(0.0),
            DataType::Vector2f => Self::Vector2f([0.0; 2]),
            DataType::Vector3f => Self::Vector3f([0.0; 3]),
            DataType::Vector4f => Self::Vector4f([0.0; 4]),
            DataType::Vector2i => Self::Vector2i([0; 2]),
            DataType::Vector3i => Self::Vector3i([0; 3]),
            DataType::Vector4i => Self::Vector4i([0; 4]),
            DataType::Matrix22f => Self::Matrix22f([1.0, 0.0, 0.0, 1.0]),
            DataType::Matrix33f => Self::Matrix33f([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]),
            DataType::Matrix44f => Self::Matrix44f([
                1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
            ]),
        }
    }
}
