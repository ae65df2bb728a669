//! 命令定义和实现

pub mod catalog;
pub mod classroom;
pub mod config;
pub mod drive;
pub mod faculty;
pub mod goto;
pub mod r#move;
pub mod ping;
pub mod reset;
pub mod rotate;
pub mod status;
pub mod stop;

pub use catalog::CatalogCommand;
pub use classroom::ClassroomCommand;
pub use config::ConfigCommand;
pub use drive::DriveCommand;
pub use faculty::FacultyCommand;
pub use goto::GotoCommand;
pub use r#move::MoveCommand;
pub use ping::PingCommand;
pub use reset::ResetCommand;
pub use rotate::RotateCommand;
pub use status::StatusCommand;
pub use stop::StopCommand;
