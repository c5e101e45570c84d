mod room_dto;

pub use room_dto::{CreateRoomDto, JoinRoomDto};
