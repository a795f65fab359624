// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]

//! Activity events: the immutable records of administrative actions.
//!
//! An [`ActivityDraft`] is what arrives at the boundary, loosely typed and
//! possibly incomplete. Validation turns it into a [`NewActivity`], which is
//! stamped with an id and persistence time to become an [`ActivityEvent`].
//! Events are never mutated after they are written.

mod draft;
mod event;
mod id;

#[cfg(test)]
mod tests;

pub use draft::{ActivityDraft, ValidationError};
pub use event::{ActivityEvent, NewActivity};
pub use id::generate_activity_id;
