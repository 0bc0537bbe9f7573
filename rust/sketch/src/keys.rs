// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena keys.

use slotmap::new_key_type;

new_key_type! {
    /// Key of a gauging point held by a [`crate::arena::PointArena`].
    pub struct PointKey;
}
