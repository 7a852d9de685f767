mod filter;
mod helpers;
mod list;
mod recommend;

pub(crate) use filter::cmd_filter;
pub(crate) use list::cmd_list;
pub(crate) use recommend::{MatchMode, PreferenceArgs, cmd_recommend};
