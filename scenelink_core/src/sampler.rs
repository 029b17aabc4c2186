// Copyright 2026 the Scenelink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Texture sampler state and content.

use crate::ids::{
    OffscreenBufferHandle, RenderBufferHandle, ResourceContentHash, TextureBufferHandle,
};

/// Texture coordinate addressing mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AddressMode {
    /// Clamp to the edge texel.
    #[default]
    Clamp,
    /// Repeat the texture.
    Repeat,
    /// Repeat with mirroring.
    Mirror,
}

/// Texture filtering mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Nearest texel.
    Nearest,
    /// Linear interpolation.
    #[default]
    Linear,
    /// Trilinear interpolation across mip levels.
    Trilinear,
}

/// Addressing and filtering state of a sampler.
///
/// Links never modify these; only [`SamplerContent`] is replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SamplerStates {
    /// Addressing along U.
    pub address_u: AddressMode,
    /// Addressing along V.
    pub address_v: AddressMode,
    /// Addressing along R (3D textures).
    pub address_r: AddressMode,
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Anisotropy level (1 = off).
    pub anisotropy: u32,
}

impl Default for SamplerStates {
    fn default() -> Self {
        Self {
            address_u: AddressMode::Clamp,
            address_v: AddressMode::Clamp,
            address_r: AddressMode::Clamp,
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            anisotropy: 1,
        }
    }
}

/// What a sampler reads from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SamplerContent {
    /// A client texture resource identified by its content hash.
    ClientTexture(ResourceContentHash),
    /// A render buffer of the same scene.
    RenderBuffer(RenderBufferHandle),
    /// A renderer-owned offscreen buffer.
    OffscreenBuffer(OffscreenBufferHandle),
    /// A texture buffer of the same scene.
    TextureBuffer(TextureBufferHandle),
}

impl Default for SamplerContent {
    fn default() -> Self {
        Self::ClientTexture(ResourceContentHash::INVALID)
    }
}

/// A complete texture sampler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextureSampler {
    /// Addressing and filtering state.
    pub states: SamplerStates,
    /// Content source.
    pub content: SamplerContent,
}

impl TextureSampler {
    /// Creates a sampler with default states reading `content`.
    #[must_use]
    pub fn new(content: SamplerContent) -> Self {
        Self {
            states: SamplerStates::default(),
            content,
        }
    }
}
