//! Performance-trace insight computation.
//!
//! Each insight is a pure, synchronous function over an already-parsed trace
//! data model ([`parsed_trace::ParsedTrace`]) plus a per-navigation context:
//! no I/O, no shared mutable state, deterministic output for identical
//! input. Generators never call one another; an orchestrator invokes each
//! independently and isolates failures per (navigation, insight) pair.
//!
//! - [`cls_culprits`] attributes layout shifts to iframe creations, font
//!   fetches, non-composited animations, and unsized images.
//! - [`render_blocking`] finds requests that blocked first paint and
//!   optionally estimates savings against a what-if [`simulation`] model.
//! - [`third_party`] attributes transfer size and main-thread time per
//!   owning organization via the [`entity_registry`].
//! - [`viewport`] checks compositor commits for mobile-optimized viewport
//!   metadata.

#![forbid(unsafe_code)]

pub mod animation_failures;
pub mod cls_culprits;
pub mod entity_registry;
pub mod event_lookup;
pub mod insight;
pub mod parsed_trace;
pub mod render_blocking;
pub mod root_causes;
pub mod shift_grouping;
pub mod simulation;
pub mod third_party;
pub mod timing;
pub mod trace_event;
pub mod viewport;
