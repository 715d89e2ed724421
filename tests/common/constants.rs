//! Shared constants for the e2e test fixtures.

/// "Blinding Lights" - charts globally on 2021-01-01 and 2021-01-03
pub const TRACK_ONE: &str = "0VjIjW4GlUZAMYd2vXMi3b";

/// "ROCKSTAR" - charts globally on 2021-01-02 only
pub const TRACK_TWO: &str = "7ytR5pFWmSjzHJIeQkgog4";

/// "Supalonely" - has metadata but never charted
pub const TRACK_UNCHARTED: &str = "4nK5YrxbMGZstTLbvj6Gxw";

/// Chart entries exist for this id but no metadata row does
pub const TRACK_WITHOUT_METADATA: &str = "no-metadata-track";

pub const REQUEST_TIMEOUT_SECS: u64 = 10;
