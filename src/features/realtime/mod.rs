pub mod live_room;
pub mod reconciler;

pub use live_room::LiveRoom;
pub use reconciler::RoomView;
