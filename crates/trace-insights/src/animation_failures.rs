//! Decoding of compositor non-composited-animation failure bitmasks.
//!
//! The compositor reports why an animation could not be moved off the main
//! thread as a bitmask over a fixed reason table (bits 0..=19). Bit 8 and
//! bit 14 are reserved: both had reasons assigned historically and were
//! retired, so those positions must stay unassigned rather than be reused.

use serde::{Deserialize, Serialize};

use crate::trace_event::AnimationEvent;

// ---------------------------------------------------------------------------
// AnimationFailureReason — the fixed reason table
// ---------------------------------------------------------------------------

/// One decoded reason an animation ran on the main thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationFailureReason {
    AcceleratedAnimationsDisabled,
    EffectSuppressedByDevtools,
    InvalidAnimationOrEffect,
    EffectHasUnsupportedTimingParameters,
    EffectHasNonReplaceCompositeMode,
    TargetHasInvalidCompositingState,
    TargetHasIncompatibleAnimations,
    TargetHasCssOffset,
    AnimationAffectsNonCssProperties,
    TransformRelatedPropertyCannotBeAcceleratedOnTarget,
    TransformDependsOnBoxSize,
    FilterRelatedPropertyMayMovePixels,
    UnsupportedCssProperty,
    MixedKeyframeValueTypes,
    TimelineSourceHasInvalidCompositingState,
    AnimationHasNoVisibleChange,
    AffectsImportantProperty,
    SvgTargetHasIndependentTransformProperty,
}

/// (bit position, reason) pairs for every actionable bit. Positions 8 and 14
/// are reserved (retired reasons) and deliberately missing.
pub const ACTIONABLE_FAILURE_REASONS: &[(u32, AnimationFailureReason)] = &[
    (0, AnimationFailureReason::AcceleratedAnimationsDisabled),
    (1, AnimationFailureReason::EffectSuppressedByDevtools),
    (2, AnimationFailureReason::InvalidAnimationOrEffect),
    (3, AnimationFailureReason::EffectHasUnsupportedTimingParameters),
    (4, AnimationFailureReason::EffectHasNonReplaceCompositeMode),
    (5, AnimationFailureReason::TargetHasInvalidCompositingState),
    (6, AnimationFailureReason::TargetHasIncompatibleAnimations),
    (7, AnimationFailureReason::TargetHasCssOffset),
    (9, AnimationFailureReason::AnimationAffectsNonCssProperties),
    (
        10,
        AnimationFailureReason::TransformRelatedPropertyCannotBeAcceleratedOnTarget,
    ),
    (11, AnimationFailureReason::TransformDependsOnBoxSize),
    (12, AnimationFailureReason::FilterRelatedPropertyMayMovePixels),
    (13, AnimationFailureReason::UnsupportedCssProperty),
    (15, AnimationFailureReason::MixedKeyframeValueTypes),
    (
        16,
        AnimationFailureReason::TimelineSourceHasInvalidCompositingState,
    ),
    (17, AnimationFailureReason::AnimationHasNoVisibleChange),
    (18, AnimationFailureReason::AffectsImportantProperty),
    (
        19,
        AnimationFailureReason::SvgTargetHasIndependentTransformProperty,
    ),
];

/// Decode every actionable bit set in `mask`, in bit-position order.
/// Reserved and out-of-table bits are ignored.
pub fn decode_failure_mask(mask: u32) -> Vec<AnimationFailureReason> {
    ACTIONABLE_FAILURE_REASONS
        .iter()
        .filter(|(bit, _)| mask & (1 << bit) != 0)
        .map(|(_, reason)| *reason)
        .collect()
}

// ---------------------------------------------------------------------------
// NonCompositedFailure — one failure record per qualifying instant
// ---------------------------------------------------------------------------

/// One non-composited-animation failure, derived from a single instant
/// sub-event that carried a non-zero failure mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonCompositedFailure {
    /// Author-visible animation name, when recorded.
    pub name: Option<String>,
    /// Decoded reasons, in bit-position order.
    pub failure_reasons: Vec<AnimationFailureReason>,
    /// CSS property names the compositor could not accelerate.
    pub unsupported_properties: Option<Vec<String>>,
    /// Arena index of the originating animation in the in-scope sequence.
    pub animation_index: usize,
}

/// Decode every qualifying instant of one animation. An animation with
/// multiple masked instants yields multiple failure records, all pointing
/// back at `animation_index`; an instant with a zero mask yields none.
pub fn non_composited_failures(
    animation: &AnimationEvent,
    animation_index: usize,
) -> Vec<NonCompositedFailure> {
    animation
        .instants
        .iter()
        .filter(|instant| instant.composite_failed_mask != 0)
        .map(|instant| NonCompositedFailure {
            name: animation.name.clone(),
            failure_reasons: decode_failure_mask(instant.composite_failed_mask),
            unsupported_properties: instant.unsupported_properties.clone(),
            animation_index,
        })
        .collect()
}
