use clap::{Parser, Subcommand};

use crate::dto::Tag;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List notes, optionally filtered by search term and tag
    List {
        /// Search term matched against title and content
        #[arg(short, long)]
        search: Option<String>,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Only notes with this tag
        #[arg(short, long)]
        tag: Option<Tag>,
    },

    /// Show a single note
    Show {
        #[arg(value_name = "NOTE_ID")]
        id: i64,
    },

    /// Edit or submit the saved note draft
    Draft {
        #[command(subcommand)]
        command: DraftCommand,
    },

    /// Fill the draft and submit it in one step
    Create {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        content: String,

        #[arg(long, default_value = "Todo")]
        tag: String,
    },

    /// Delete a note
    Delete {
        #[arg(value_name = "NOTE_ID")]
        id: i64,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum DraftCommand {
    /// Print the current draft
    Show,

    /// Change draft fields; omitted fields keep their value
    Set {
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        tag: Option<String>,
    },

    /// Discard the draft
    Clear,

    /// Validate the draft and create the note
    Submit,
}
