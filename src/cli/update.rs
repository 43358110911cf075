//! Update subcommand arguments

use crate::types::TodoPatch;
use clap::Args;

/// Arguments for the update subcommand
#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Id of the todo to change
    pub id: i64,

    /// New text (trimmed; must not be empty)
    #[arg(short, long)]
    pub text: Option<String>,

    /// New completion flag
    #[arg(long, value_name = "BOOL")]
    pub completed: Option<bool>,
}

impl UpdateArgs {
    /// Only flags given on the command line end up in the patch.
    pub fn to_patch(&self) -> TodoPatch {
        TodoPatch {
            text: self.text.clone(),
            is_completed: self.completed,
        }
    }
}
