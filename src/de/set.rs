//
// Copyright 2026 biplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Serde's data model has sequences but no unordered set, so a bplist set
//! would be indistinguishable from an array after a trip through serde.
//! Set values are therefore carried as a structure with a special name
//! whose single field holds the elements as a sequence, the same device
//! used for Dates and UIDs.

/// Name of the Set pseudo-structure.
pub const STRUCT_NAME: &str = "$__biplist_private_Set";

/// Name of the field in the structure, holding the elements as a sequence.
pub const STRUCT_FIELD: &str = "$__biplist_private_Set_elements";
