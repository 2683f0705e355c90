mod client;
pub mod events;

pub use client::{
    EventStreamClient, StreamCallbacks, StreamCompleteCallback, StreamErrorCallback,
    StreamEventCallback, Subscription,
};
pub use events::StreamEvent;
