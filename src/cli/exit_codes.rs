//! Process exit codes

use crate::error::FailureKind;

/// Success
pub const SUCCESS: i32 = 0;

/// General or repository error
pub const ERROR: i32 = 1;

/// Usage error; clap exits with this on its own
pub const USAGE: i32 = 2;

/// Configuration or template error
pub const CONFIG_ERROR: i32 = 3;

/// Pull or push failed
pub const SYNC_ERROR: i32 = 4;

/// Tag could not be created
pub const TAG_CREATION_ERROR: i32 = 5;

/// Tag was created but the post-tag command failed
pub const POST_ACTION_ERROR: i32 = 6;

/// Exit code reported for a failure class
pub fn for_kind(kind: FailureKind) -> i32 {
    match kind {
        FailureKind::Template | FailureKind::Config => CONFIG_ERROR,
        FailureKind::Sync => SYNC_ERROR,
        FailureKind::TagCreation => TAG_CREATION_ERROR,
        FailureKind::PostAction => POST_ACTION_ERROR,
        FailureKind::Parse | FailureKind::Repository => ERROR,
    }
}
