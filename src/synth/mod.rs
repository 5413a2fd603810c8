// Purpose: drum voices, the engine that routes events to them, and the
// queues that carry control input onto the audio thread

pub mod engine;
pub mod message;
pub mod trigger_queue;
pub mod voice;
