pub mod node;
pub mod packet_exchange;

pub use node::TestNode;
pub use packet_exchange::{deliver_delta, deliver_full, encode, encode_delta, encode_full, init_logging};
