pub mod client;
pub mod protocol;

pub use client::{AiBridge, BridgeEvent, BridgeHandle};
pub use protocol::{parse_reply, AiReply, MoveRequest};
