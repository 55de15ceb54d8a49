// The monophonic voice and the two channels that feed it from the control side:
// the gate mailbox (pitch + gate) and the parameter queue.

pub mod gate;
pub mod message;
pub mod voice;

pub use gate::{gate_channel, GatePublisher, GateReceiver, GateSnapshot, GateState};
#[cfg(feature = "rtrb")]
pub use message::param_channel;
pub use message::{MessageReceiver, NoMessages, ParamMessage, PARAM_QUEUE_SIZE};
pub use voice::Voice;
