mod event;
mod sync_list;

pub use event::{ListChange, ListEvent, ListOperation};
pub use sync_list::SyncList;
